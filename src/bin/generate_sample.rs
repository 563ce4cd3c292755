use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct SiteProfile {
    name: &'static str,
    code: &'static str,
    longitude: f64,
    latitude: f64,
    mean: f64,
    seasonal_amplitude: f64,
    diurnal_amplitude: f64,
    noise: f64,
    /// None produces a catalog entry without a data file.
    first_date: Option<NaiveDate>,
}

fn temperature_at(ts: NaiveDateTime, profile: &SiteProfile, rng: &mut SimpleRng) -> f64 {
    use std::f64::consts::TAU;
    // Warmest around mid-July (day 196) and mid-afternoon.
    let day = ts.ordinal() as f64;
    let hour = ts.hour() as f64;
    let seasonal = profile.seasonal_amplitude * (TAU * (day - 196.0) / 365.0).cos();
    let diurnal = profile.diurnal_amplitude * (TAU * (hour - 15.0) / 24.0).cos();
    profile.mean + seasonal + diurnal + rng.gauss(0.0, profile.noise)
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let date = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let last_date = date(2025, 6, 30);

    let sites = [
        SiteProfile {
            name: "Salmon River at Somes Bar",
            code: "SRSB",
            longitude: -123.478,
            latitude: 41.379,
            mean: 11.0,
            seasonal_amplitude: 7.5,
            diurnal_amplitude: 0.8,
            noise: 0.35,
            first_date: Some(date(2023, 1, 1)),
        },
        SiteProfile {
            name: "Klamath River at Orleans",
            code: "KLOR",
            longitude: -123.534,
            latitude: 41.303,
            mean: 12.5,
            seasonal_amplitude: 8.0,
            diurnal_amplitude: 0.6,
            noise: 0.3,
            first_date: Some(date(2023, 1, 1)),
        },
        SiteProfile {
            name: "Wooley Creek near Forks of Salmon",
            code: "WOOL",
            longitude: -123.328,
            latitude: 41.325,
            mean: 9.5,
            seasonal_amplitude: 6.5,
            diurnal_amplitude: 1.0,
            noise: 0.4,
            first_date: Some(date(2024, 3, 15)),
        },
        SiteProfile {
            name: "Salmon River Air",
            code: "SR-AIR1",
            longitude: -123.477,
            latitude: 41.38,
            mean: 13.0,
            seasonal_amplitude: 10.0,
            diurnal_amplitude: 6.0,
            noise: 1.2,
            first_date: Some(date(2023, 1, 1)),
        },
        SiteProfile {
            name: "Forks of Salmon Air",
            code: "FS-AIR1",
            longitude: -123.322,
            latitude: 41.257,
            mean: 13.5,
            seasonal_amplitude: 10.5,
            diurnal_amplitude: 6.5,
            noise: 1.2,
            first_date: Some(date(2024, 1, 1)),
        },
        SiteProfile {
            name: "Nordheimer Creek",
            code: "NORD",
            longitude: -123.349,
            latitude: 41.31,
            mean: 9.0,
            seasonal_amplitude: 6.0,
            diurnal_amplitude: 1.0,
            noise: 0.4,
            first_date: None,
        },
    ];

    let data_dir = Path::new("data");
    let sites_dir = data_dir.join("sites");
    fs::create_dir_all(&sites_dir).expect("Failed to create data directories");

    // ---- Catalog ----
    let catalog_path = data_dir.join("sites.csv");
    let mut catalog = csv::Writer::from_path(&catalog_path).expect("Failed to create catalog");
    catalog
        .write_record(["name", "code", "longitude", "latitude"])
        .expect("Failed to write catalog header");
    for profile in &sites {
        catalog
            .write_record([
                profile.name.to_string(),
                profile.code.to_string(),
                format!("{:.3}", profile.longitude),
                format!("{:.3}", profile.latitude),
            ])
            .expect("Failed to write catalog row");
    }
    // One deliberately broken row: the viewer should skip it and log the index.
    catalog
        .write_record(["Granite Creek", "GRAN", "", "41.28"])
        .expect("Failed to write catalog row");
    catalog.flush().expect("Failed to flush catalog");

    // ---- Per-site time series ----
    let mut files = 0usize;
    let mut total_rows = 0usize;
    for profile in &sites {
        let Some(first_date) = profile.first_date else {
            continue;
        };

        let path = sites_dir.join(format!("{}.csv", profile.code));
        let mut writer = csv::Writer::from_path(&path).expect("Failed to create site file");
        writer
            .write_record(["DateTime", "TempC"])
            .expect("Failed to write site header");

        let mut rows = 0usize;
        let mut day = first_date;
        while day <= last_date {
            for hour in [0u32, 6, 12, 18] {
                let ts = day.and_hms_opt(hour, 0, 0).unwrap();
                let temp = temperature_at(ts, profile, &mut rng);
                writer
                    .write_record([
                        ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                        format!("{temp:.2}"),
                    ])
                    .expect("Failed to write observation");
                rows += 1;
            }
            day = day.succ_opt().unwrap();
        }
        writer.flush().expect("Failed to flush site file");

        files += 1;
        total_rows += rows;
    }

    println!(
        "Wrote {} catalog entries and {files} site files ({total_rows} observations) under {}",
        sites.len() + 1,
        data_dir.display()
    );
}
