//! End-to-end emission scenarios: service + estimator + admission +
//! state, driven through scripted ports.

use crate::harness::{validator_set, RecordingSink, ScriptedSource, ScriptedWorld};
use photon_emitter::{
    CandidateSource, ConsensusReader, DeferReason, EmissionDecision, EmitIntervals, EmitterConfig,
    EmitterService, EventSink, ProgressSnapshot, DECIMAL_UNIT,
};
use shared_types::{CandidateEvent, EmittedEvent, GasPowerLeft, Timestamp, ValidatorId};
use std::sync::Arc;
use std::time::Duration;

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn intervals() -> EmitIntervals {
    EmitIntervals {
        min: Duration::from_millis(110),
        max: Duration::from_secs(600),
        confirming: Duration::from_millis(120),
    }
}

fn service(
    validator_id: ValidatorId,
    world: &Arc<ScriptedWorld>,
    source: &Arc<ScriptedSource>,
    sink: &Arc<RecordingSink>,
) -> Arc<EmitterService> {
    init_logs();
    let config = EmitterConfig {
        validator_id,
        intervals: intervals(),
        ..EmitterConfig::default()
    };
    Arc::new(
        EmitterService::new(
            config,
            Arc::clone(world) as Arc<dyn ConsensusReader>,
            Arc::clone(source) as Arc<dyn CandidateSource>,
            Arc::clone(sink) as Arc<dyn EventSink>,
        )
        .expect("valid intervals"),
    )
}

fn candidate(creator: ValidatorId, seq: u32, elapsed: Duration) -> CandidateEvent {
    CandidateEvent {
        creator,
        seq,
        creation_time: Timestamp::now().add(elapsed),
        gas_power_left: GasPowerLeft {
            gas: [1_000_000, 1_000_000],
        },
        carries_txs: true,
    }
}

#[tokio::test]
async fn emits_once_network_is_stale_enough() {
    let world = Arc::new(ScriptedWorld::new(validator_set(1, &[100, 100, 100])));
    let source = Arc::new(ScriptedSource::new());
    let sink = Arc::new(RecordingSink::default());
    let svc = service(1, &world, &source, &sink);

    // Fresh state, candidate built a moment after start: min interval
    // not reached, the service defers.
    *source.candidate.lock() = Some(candidate(1, 3, Duration::from_millis(10)));
    let decision = svc.tick().await.unwrap();
    assert_eq!(
        decision,
        Some(EmissionDecision::Defer(DeferReason::MinInterval))
    );
    assert!(sink.broadcasts.lock().is_empty());

    // Same candidate re-built past the max interval: forced emission.
    *source.candidate.lock() = Some(candidate(1, 3, Duration::from_secs(601)));
    let decision = svc.tick().await.unwrap();
    assert_eq!(decision, Some(EmissionDecision::Emit));
    assert_eq!(sink.broadcasts.lock().len(), 1);
}

#[tokio::test]
async fn missed_blocks_force_emission_despite_idle() {
    let world = Arc::new(ScriptedWorld::new(validator_set(1, &[100, 100, 100])));
    let source = Arc::new(ScriptedSource::new());
    let sink = Arc::new(RecordingSink::default());
    let svc = service(1, &world, &source, &sink);

    // Emit once to anchor prev_emitted_at_block at block 10.
    *world.latest_block.lock() = 10;
    *source.candidate.lock() = Some(candidate(1, 3, Duration::from_secs(601)));
    assert_eq!(svc.tick().await.unwrap(), Some(EmissionDecision::Emit));

    // Idle, no payload, a moment later: deferred.
    source
        .idle
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let mut quiet = candidate(1, 4, Duration::from_secs(602));
    quiet.carries_txs = false;
    *source.candidate.lock() = Some(quiet.clone());
    let decision = svc.tick().await.unwrap();
    assert_eq!(decision, Some(EmissionDecision::Defer(DeferReason::NoWork)));

    // 45 blocks behind (slack 50 -> maxBlocks 45): liveness overrides
    // every throttle.
    *world.latest_block.lock() = 55;
    *source.candidate.lock() = Some(quiet);
    assert_eq!(svc.tick().await.unwrap(), Some(EmissionDecision::Emit));
    assert_eq!(sink.broadcasts.lock().len(), 2);
}

#[tokio::test]
async fn emergency_power_blocks_even_when_stale() {
    let world = Arc::new(ScriptedWorld::new(validator_set(1, &[100, 900])));
    let source = Arc::new(ScriptedSource::new());
    let sink = Arc::new(RecordingSink::default());
    let svc = service(1, &world, &source, &sink);

    let mut drained = candidate(1, 8, Duration::from_secs(900));
    drained.gas_power_left = GasPowerLeft { gas: [400, 400] };
    *source.candidate.lock() = Some(drained);
    *source.self_parent.lock() = Some(EmittedEvent {
        seq: 7,
        creation_time: Timestamp::now(),
        gas_power_left: GasPowerLeft { gas: [950, 950] },
    });

    let decision = svc.tick().await.unwrap();
    assert!(matches!(decision, Some(EmissionDecision::Blocked(_))));
    assert!(sink.broadcasts.lock().is_empty());
    assert_eq!(svc.metrics().get_events_emitted(), 0);
}

#[tokio::test]
async fn epoch_swap_rebuilds_stake_ratios() {
    let world = Arc::new(ScriptedWorld::new(validator_set(1, &[250, 750])));
    let source = Arc::new(ScriptedSource::new());
    let sink = Arc::new(RecordingSink::default());
    let svc = service(1, &world, &source, &sink);

    *source.candidate.lock() = Some(candidate(1, 3, Duration::from_secs(601)));
    svc.tick().await.unwrap();
    assert_eq!(svc.state().snapshot(1).stake_ratio, DECIMAL_UNIT / 4);

    // New epoch: validator 1 now holds half the stake.
    *world.validators.lock() = Arc::new(validator_set(2, &[500, 500]));
    *source.candidate.lock() = Some(candidate(1, 4, Duration::from_secs(1_300)));
    svc.tick().await.unwrap();
    assert_eq!(svc.state().epoch(), 2);
    assert_eq!(svc.state().snapshot(1).stake_ratio, DECIMAL_UNIT / 2);
}

#[tokio::test]
async fn quorum_metric_flows_into_throttle() {
    // Validator 1 carries 70% of the stake so its progress dominates
    // the weighted metric.
    let world = Arc::new(ScriptedWorld::new(validator_set(1, &[700, 100, 100, 100])));
    let source = Arc::new(ScriptedSource::new());
    let sink = Arc::new(RecordingSink::default());
    let svc = service(1, &world, &source, &sink);

    // Anchor a first emission so elapsed times are meaningful.
    *source.candidate.lock() = Some(candidate(1, 5, Duration::from_secs(601)));
    assert_eq!(svc.tick().await.unwrap(), Some(EmissionDecision::Emit));

    // The candidate does not advance past the median: raw metric 0,
    // event metric stays tiny (seq > 2, no kickstart), and 300 ms of
    // elapsed time shrink below the min interval.
    *world.progress.lock() = ProgressSnapshot {
        median_seq: 10,
        current_seq: 10,
    };
    *source.candidate.lock() = Some(candidate(1, 6, Duration::from_secs(601) + Duration::from_millis(300)));
    let decision = svc.tick().await.unwrap();
    assert_eq!(
        decision,
        Some(EmissionDecision::Defer(DeferReason::MetricTooLow))
    );

    // A candidate far ahead of both baselines scores a strong metric
    // and the same elapsed time clears the throttle.
    *world.progress.lock() = ProgressSnapshot {
        median_seq: 3,
        current_seq: 3,
    };
    *source.candidate.lock() = Some(candidate(1, 6, Duration::from_secs(601) + Duration::from_millis(300)));
    assert_eq!(svc.tick().await.unwrap(), Some(EmissionDecision::Emit));
}
