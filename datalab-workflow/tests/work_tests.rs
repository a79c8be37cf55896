use datalab_core::*;
use datalab_workflow::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

fn context(kind: TaskKind) -> (WorkContext, mpsc::UnboundedReceiver<f64>) {
    let task_id = TaskId::new();
    let (reporter, rx) = ProgressReporter::channel(task_id);
    let ctx = WorkContext::new(task_id, kind, json!({}), reporter, CancellationToken::new());
    (ctx, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<f64>) -> Vec<f64> {
    let mut values = Vec::new();
    while let Ok(value) = rx.try_recv() {
        values.push(value);
    }
    values
}

fn fast_progress() -> SimulatedProgress {
    SimulatedProgress::new(Duration::from_millis(500), 15.0)
}

fn edge_cases() -> Vec<EdgeCase> {
    let case = |id: &str, strategy, severity| EdgeCase {
        id: id.to_string(),
        strategy,
        severity,
        title: format!("Case {}", id),
        description: String::new(),
        example: String::new(),
        confidence: 0.9,
        category: "Test".to_string(),
        dataset: "Demo".to_string(),
        impact: String::new(),
    };
    vec![
        case("1", MiningStrategy::BiasDetection, Severity::High),
        case("2", MiningStrategy::FailureModes, Severity::Medium),
        case("3", MiningStrategy::BiasDetection, Severity::Low),
        case("4", MiningStrategy::OutlierDetection, Severity::Low),
    ]
}

// ===== SimulatedProgress =====

#[tokio::test(start_paused = true)]
async fn test_simulated_progress_reaches_100() {
    let (ctx, mut rx) = context(TaskKind::Generation);
    assert_ok!(fast_progress().run(&ctx).await);

    let values = drain(&mut rx);
    assert!(!values.is_empty());
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!(values.iter().all(|v| (0.0..=100.0).contains(v)));
    assert_eq!(values.last().copied(), Some(100.0));
}

#[tokio::test(start_paused = true)]
async fn test_simulated_progress_every_tick_moves_forward() {
    let (ctx, mut rx) = context(TaskKind::Generation);
    let progress = SimulatedProgress::new(Duration::from_millis(500), 2.0);
    progress.run(&ctx).await.unwrap();

    let mut previous = 0.0;
    for value in drain(&mut rx) {
        let step = value - previous;
        assert!(step > 0.0, "stalled at {}", previous);
        assert!(step <= progress.max_step() + 1e-9);
        previous = value;
    }
    assert_eq!(previous, 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_simulated_progress_ticks_on_interval() {
    let (ctx, mut rx) = context(TaskKind::Generation);
    let progress = fast_progress();
    let start = tokio::time::Instant::now();
    progress.run(&ctx).await.unwrap();

    let ticks = drain(&mut rx).len() as u32;
    assert_eq!(start.elapsed(), progress.interval() * ticks);
}

#[tokio::test(start_paused = true)]
async fn test_simulated_progress_stops_on_cancel() {
    let (ctx, mut rx) = context(TaskKind::Generation);
    let token = ctx.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1200)).await;
        token.cancel();
    });

    assert_err!(fast_progress().run(&ctx).await);
    let values = drain(&mut rx);
    assert_eq!(values.len(), 2);
    assert!(values.last().copied().unwrap_or_default() < 100.0);
}

#[tokio::test]
async fn test_simulated_progress_rejects_zero_step() {
    let (ctx, _rx) = context(TaskKind::Generation);
    let err = SimulatedProgress::new(Duration::from_millis(1), 0.0)
        .run(&ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn test_simulated_progress_from_config() {
    let progress = SimulatedProgress::from_config(&TaskConfig::default());
    assert_eq!(progress.interval(), Duration::from_millis(500));
    assert_eq!(progress.max_step(), 15.0);
}

proptest! {
    #[test]
    fn prop_simulated_progress_is_monotonic(step in 0.5f64..50.0, from in 0.0f64..50.0) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        let values = runtime.block_on(async {
            let (ctx, mut rx) = context(TaskKind::PipelineRun);
            SimulatedProgress::new(Duration::from_millis(10), step)
                .advance(&ctx, from, 75.0)
                .await
                .unwrap();
            drain(&mut rx)
        });

        prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(values.iter().all(|v| *v >= from && *v <= 75.0));
        prop_assert_eq!(values.last().copied(), Some(75.0));
    }
}

// ===== GenerationWork =====

#[test]
fn test_generation_params_defaults() {
    let work = GenerationWork::from_params(&json!({"template": "tabular-data"}), fast_progress()).unwrap();
    assert_eq!(work.params().template, GenerationTemplate::TabularData);
    assert_eq!(work.params().output_count, 100);
    assert_eq!(work.params().prompt, None);
}

#[test]
fn test_generation_params_validation() {
    let missing = GenerationWork::from_params(&json!({}), fast_progress());
    assert!(matches!(missing, Err(CoreError::Validation(_))));

    let unknown = GenerationWork::from_params(&json!({"template": "poetry"}), fast_progress());
    assert!(matches!(unknown, Err(CoreError::Validation(_))));

    let zero = GenerationWork::from_params(
        &json!({"template": "code-comments", "output_count": 0}),
        fast_progress(),
    );
    assert!(matches!(zero, Err(CoreError::Validation(_))));
}

#[test]
fn test_generation_template_metadata() {
    assert_eq!(GenerationTemplate::MedicalNotes.category(), "Healthcare");
    assert_eq!(
        GenerationTemplate::CustomerService.parameters(),
        &["tone", "complexity", "industry"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_generation_work_result() {
    let work = GenerationWork::from_params(
        &json!({"template": "customer-service", "prompt": "angry refunds", "output_count": 250}),
        fast_progress(),
    )
    .unwrap();
    let (ctx, _rx) = context(TaskKind::Generation);

    let result = work.run(ctx).await.unwrap();
    assert_eq!(result["template"], "customer-service");
    assert_eq!(result["category"], "Text");
    assert_eq!(result["generated"], 250);
    assert_eq!(result["prompt"], "angry refunds");
}

// ===== MiningAnalysisWork =====

#[test]
fn test_mining_requires_strategy_or_prompt() {
    let catalog = std::sync::Arc::new(edge_cases());
    let err = MiningAnalysisWork::from_params(&json!({"dataset": "HR"}), catalog.clone(), fast_progress());
    assert!(matches!(err, Err(CoreError::Validation(_))));

    let blank = MiningAnalysisWork::from_params(
        &json!({"dataset": "HR", "custom_prompt": "   "}),
        catalog.clone(),
        fast_progress(),
    );
    assert!(blank.is_err());

    let prompt = MiningAnalysisWork::from_params(
        &json!({"dataset": "HR", "custom_prompt": "find sarcasm"}),
        catalog,
        fast_progress(),
    );
    assert!(prompt.is_ok());
}

#[test]
fn test_mining_rejects_unknown_severity() {
    let result = MiningAnalysisWork::from_params(
        &json!({"dataset": "HR", "strategy": "bias-detection", "severity": "critical"}),
        std::sync::Arc::new(edge_cases()),
        fast_progress(),
    );
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_mining_filters_by_strategy_and_severity() {
    let work = MiningAnalysisWork::from_params(
        &json!({"dataset": "HR Job Postings", "strategy": "bias-detection", "severity": "high"}),
        std::sync::Arc::new(edge_cases()),
        fast_progress(),
    )
    .unwrap();
    let (ctx, _rx) = context(TaskKind::MiningAnalysis);

    let result = work.run(ctx).await.unwrap();
    assert_eq!(result["cases_found"], 1);
    assert_eq!(result["edge_cases"][0]["id"], "1");
    assert_eq!(result["dataset"], "HR Job Postings");
}

#[tokio::test(start_paused = true)]
async fn test_mining_all_severity_keeps_strategy_matches() {
    let work = MiningAnalysisWork::from_params(
        &json!({"dataset": "HR", "strategy": "bias-detection", "severity": "all"}),
        std::sync::Arc::new(edge_cases()),
        fast_progress(),
    )
    .unwrap();
    let (ctx, _rx) = context(TaskKind::MiningAnalysis);

    let result = work.run(ctx).await.unwrap();
    assert_eq!(result["cases_found"], 2);
}

// ===== PipelineRunWork =====

#[tokio::test(start_paused = true)]
async fn test_pipeline_runs_stages_in_order() {
    let work = PipelineRunWork::from_params(
        &json!({"name": "Data Preprocessing Pipeline", "stages": ["Data Ingestion", "Cleaning", "Validation", "Feature Engineering"]}),
        fast_progress(),
    )
    .unwrap();
    let (ctx, mut rx) = context(TaskKind::PipelineRun);

    let result = work.run(ctx).await.unwrap();
    assert_eq!(
        result["stages_completed"],
        json!(["Data Ingestion", "Cleaning", "Validation", "Feature Engineering"])
    );

    let values = drain(&mut rx);
    assert!(values.contains(&25.0));
    assert!(values.contains(&50.0));
    assert!(values.contains(&75.0));
    assert_eq!(values.last().copied(), Some(100.0));
}

#[test]
fn test_pipeline_params_validation() {
    assert!(PipelineRunWork::from_params(&json!({"name": "p", "stages": []}), fast_progress()).is_err());
    assert!(PipelineRunWork::from_params(&json!({"name": "p", "stages": [" "]}), fast_progress()).is_err());
    assert!(PipelineRunWork::from_params(&json!({"stages": ["a"]}), fast_progress()).is_err());
}

// ===== WorkFactory =====

#[test]
fn test_factory_builds_each_kind() {
    let factory = WorkFactory::new(fast_progress(), edge_cases());

    let generation = factory
        .build(TaskKind::Generation, &json!({"template": "tabular-data"}))
        .unwrap();
    assert_eq!(generation.name(), "generation");

    let mining = factory
        .build(TaskKind::MiningAnalysis, &json!({"dataset": "d", "strategy": "outlier-detection"}))
        .unwrap();
    assert_eq!(mining.name(), "mining-analysis");

    let pipeline = factory
        .build(TaskKind::PipelineRun, &json!({"name": "p", "stages": ["load"]}))
        .unwrap();
    assert_eq!(pipeline.name(), "pipeline-run");
}

#[test]
fn test_factory_rejects_bad_params() {
    let factory = WorkFactory::from_config(&TaskConfig::default(), vec![]);
    let err = factory.build(TaskKind::Generation, &json!({"template": 5})).err().unwrap();
    assert!(matches!(err, CoreError::Validation(_)));
}

// ===== End to End =====

#[tokio::test(start_paused = true)]
async fn test_factory_work_through_runner() {
    let registry = TaskRegistry::new(1);
    let runner = TaskRunner::new(registry.clone());
    let factory = WorkFactory::new(fast_progress(), edge_cases());

    let params = json!({"template": "medical-notes", "output_count": 10});
    let work = factory.build(TaskKind::Generation, &params).unwrap();
    let id = registry.submit(TaskKind::Generation, params).await.unwrap();

    runner.start(id, work).await.unwrap().join().await.unwrap();

    let task = registry.get(id).await.unwrap();
    assert_eq!(task.state, TaskState::Succeeded);
    assert_eq!(task.progress, 100.0);
    assert_eq!(task.result.unwrap()["template_name"], "Medical Case Studies");
}
