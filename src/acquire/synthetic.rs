//! Synthetic alert acquisition
//!
//! Generates plausible traffic alerts inside a set of commune bounding boxes
//! and inserts them into a [`MemoryRecordStore`]. Stands in for the live feed
//! scraper when running standalone.

use super::Acquirer;
use crate::error::BackendResult;
use crate::record::{AlertRecord, Location};
use crate::store::memory::MemoryRecordStore;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Geographic bounding box of one commune
#[derive(Debug, Clone, Copy)]
pub struct Commune {
    pub name: &'static str,
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Default communes alerts are placed in
pub const COMMUNES: &[Commune] = &[
    Commune { name: "Santiago", top: -33.42, bottom: -33.47, left: -70.69, right: -70.63 },
    Commune { name: "Providencia", top: -33.41, bottom: -33.45, left: -70.63, right: -70.58 },
    Commune { name: "Las Condes", top: -33.37, bottom: -33.43, left: -70.59, right: -70.48 },
    Commune { name: "Ñuñoa", top: -33.44, bottom: -33.47, left: -70.62, right: -70.57 },
    Commune { name: "Maipú", top: -33.47, bottom: -33.55, left: -70.80, right: -70.71 },
    Commune { name: "La Florida", top: -33.50, bottom: -33.56, left: -70.62, right: -70.54 },
];

const ALERT_TYPES: &[(&str, &[&str])] = &[
    ("JAM", &["JAM_MODERATE_TRAFFIC", "JAM_HEAVY_TRAFFIC", "JAM_STAND_STILL_TRAFFIC"]),
    ("ACCIDENT", &["ACCIDENT_MINOR", "ACCIDENT_MAJOR"]),
    ("HAZARD", &["HAZARD_ON_ROAD_POT_HOLE", "HAZARD_ON_SHOULDER_CAR_STOPPED"]),
    ("ROAD_CLOSED", &["ROAD_CLOSED_EVENT", "ROAD_CLOSED_CONSTRUCTION"]),
    ("POLICE", &[]),
];

/// Acquirer producing random alerts
pub struct SyntheticAcquirer {
    store: Arc<MemoryRecordStore>,
    batch_size: usize,
    rng: Mutex<Xoshiro256PlusPlus>,
}

impl SyntheticAcquirer {
    pub fn new(store: Arc<MemoryRecordStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size,
            rng: Mutex::new(Xoshiro256PlusPlus::from_entropy()),
        }
    }

    pub fn with_seed(store: Arc<MemoryRecordStore>, batch_size: usize, seed: u64) -> Self {
        Self {
            store,
            batch_size,
            rng: Mutex::new(Xoshiro256PlusPlus::seed_from_u64(seed)),
        }
    }

    fn generate(&self) -> Vec<AlertRecord> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let now_millis = chrono::Utc::now().timestamp_millis();
        (0..self.batch_size)
            .map(|_| random_alert(&mut *rng, now_millis))
            .collect()
    }
}

fn random_alert<R: Rng>(rng: &mut R, now_millis: i64) -> AlertRecord {
    let commune = COMMUNES[rng.gen_range(0..COMMUNES.len())];
    let (alert_type, subtypes) = ALERT_TYPES[rng.gen_range(0..ALERT_TYPES.len())];
    let subtype = subtypes.choose(rng).map(|s| s.to_string());

    AlertRecord {
        alert_id: format!("{:016x}-{:08x}", rng.gen::<u64>(), rng.gen::<u32>()),
        country: "CI".to_string(),
        city: Some(commune.name.to_string()),
        alert_type: alert_type.to_string(),
        subtype,
        street: None,
        reliability: rng.gen_range(0..=10),
        confidence: rng.gen_range(0..=5),
        report_rating: rng.gen_range(0..=6),
        location: Location {
            x: rng.gen_range(commune.left..=commune.right),
            y: rng.gen_range(commune.bottom..=commune.top),
        },
        pub_millis: now_millis - rng.gen_range(0..3_600_000),
    }
}

#[async_trait]
impl Acquirer for SyntheticAcquirer {
    async fn acquire_batch(&self) -> BackendResult<usize> {
        let batch = self.generate();
        let inserted = self.store.insert_many(batch)?;
        info!(inserted, "acquisition cycle finished");
        Ok(inserted)
    }
}
