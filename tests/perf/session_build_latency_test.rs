use std::time::Instant;

use crate::backend::{ChannelError, SearchBackend};
use crate::controller::SessionController;
use crate::discovery::FixtureSource;
use crate::executor::RecordingLauncher;
use crate::model::{LaunchableItem, RankedResult};
use crate::resolver::PathResolver;

struct NullBackend;

impl SearchBackend for NullBackend {
    fn set_launchable_list(&mut self, keys: &[String]) -> Result<i64, ChannelError> {
        Ok(keys.len() as i64)
    }

    fn set_command_list(&mut self, keys: &[String]) -> Result<i64, ChannelError> {
        Ok(keys.len() as i64)
    }

    fn filter(&mut self, _pattern: &str) -> Result<Vec<RankedResult>, ChannelError> {
        Ok(Vec::new())
    }
}

fn median_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    samples[samples.len() / 2]
}

#[test]
fn candidate_rebuild_median_under_500ms() {
    let mut doc = String::from("version = 1\n\nlist = [\n");
    for i in 0..3_000 {
        doc.push_str(&format!("    \"cmd-{i:04}\\ntool-{i}.exe\\n--flag {i}\",\n"));
    }
    doc.push_str("]\n");

    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock should be valid")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("keyspring-perf-registry-{unique}.toml"));
    std::fs::write(&path, doc).expect("perf registry should be written");

    let items: Vec<LaunchableItem> = (0..2_000)
        .map(|i| {
            LaunchableItem::new(
                &format!("App {i:04}"),
                &format!("C:\\Apps\\App-{i:04}.lnk"),
            )
        })
        .collect();

    let mut controller = SessionController::new(
        NullBackend,
        vec![Box::new(FixtureSource::from_items(items))],
        Box::new(RecordingLauncher::default()),
        PathResolver::new(Vec::new(), vec![String::new()]),
        path.clone(),
    );

    // Warm the file cache before sampling.
    controller.build_candidates().expect("warm build should succeed");

    let mut samples = Vec::with_capacity(5);
    for _ in 0..5 {
        let start = Instant::now();
        controller.build_candidates().expect("build should succeed");
        samples.push(start.elapsed().as_secs_f64() * 1000.0);
    }

    std::fs::remove_file(&path).expect("perf registry should be removed");

    let median = median_ms(&mut samples);
    assert!(
        median <= 500.0,
        "candidate rebuild median too high: {median:.3}ms (budget 500.0ms); samples={samples:?}",
    );
}
