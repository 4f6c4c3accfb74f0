use chrono::NaiveDate;
use disasterlens::DisasterEvent;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Per-type profile: (name, mean severity, mean response hours, loss scale).
const PROFILES: &[(&str, f64, f64, f64)] = &[
    ("Flood", 5.0, 18.0, 4.0e6),
    ("Earthquake", 6.5, 10.0, 2.0e7),
    ("Wildfire", 5.5, 24.0, 8.0e6),
    ("Hurricane", 7.0, 14.0, 3.0e7),
    ("Drought", 4.0, 96.0, 1.5e6),
    ("Tornado", 6.0, 8.0, 5.0e6),
];

const LOCATIONS: &[(&str, f64, f64)] = &[
    ("Riverton", 29.76, -95.37),
    ("Faultline City", 34.05, -118.24),
    ("Dryhill", -33.87, 151.21),
    ("Port Gale", 25.76, -80.19),
    ("Dustbowl", 35.47, -97.52),
    ("Twister Flats", 39.10, -94.58),
    ("Lakemoor", 41.88, -87.63),
    ("Seawall", 14.60, 120.98),
];

const AID_TYPES: &[&str] = &[
    "Medical",
    "Food",
    "Shelter",
    "Financial",
    "Rescue Teams",
    "None",
];

fn main() {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let n_events = 500;
    let mut events = Vec::with_capacity(n_events);
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    for i in 0..n_events {
        let &(disaster_type, mean_sev, mean_response, loss_scale) = rng.pick(PROFILES);
        let &(location, base_lat, base_lon) = rng.pick(LOCATIONS);

        let severity_level = rng.gauss(mean_sev, 1.8).round().clamp(1.0, 10.0) as u8;
        let damage = (f64::from(severity_level) / 10.0 + rng.gauss(0.0, 0.08)).clamp(0.0, 1.0);
        let affected =
            (rng.gauss(f64::from(severity_level) * 4_000.0, 6_000.0)).max(0.0) as u64;
        let loss = (loss_scale * f64::from(severity_level) / 5.0
            * rng.gauss(1.0, 0.3).max(0.05))
        .max(0.0);
        let response = rng.gauss(mean_response, mean_response * 0.4).max(0.5);
        let aid = *rng.pick(AID_TYPES);
        let aid_amount = if aid == "None" {
            0.0
        } else {
            (loss * 0.05 * rng.next_f64()).max(0.0)
        };

        events.push(DisasterEvent {
            event_id: format!("EV-2025-{:04}", i + 1),
            date: start + chrono::Days::new(rng.next_u64() % 365),
            disaster_type: disaster_type.to_string(),
            location: location.to_string(),
            latitude: (base_lat + rng.gauss(0.0, 0.5)).clamp(-90.0, 90.0),
            longitude: (base_lon + rng.gauss(0.0, 0.5)).clamp(-180.0, 180.0),
            severity_level,
            infrastructure_damage_index: damage,
            affected_population: affected,
            estimated_economic_loss_usd: loss,
            response_time_hours: response,
            aid_provided: aid.to_string(),
            aid_amount_usd: aid_amount,
            is_major_disaster: severity_level >= 7,
        });
    }

    let output_path = "disaster_events.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    for event in &events {
        writer.serialize(event).expect("Failed to write event");
    }
    writer.flush().expect("Failed to flush writer");

    println!("Wrote {} events to {output_path}", events.len());
}
