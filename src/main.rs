use std::{env, fmt::Display, process, str::FromStr};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use forestry_ml::{
    analysis::{
        self, Analysis, GradientBoostingAnalysis, GradientBoostingParams, KnnAnalysis, KnnParams,
        NeuralNetworkAnalysis, NeuralNetworkParams,
    },
    animation::{AnimationHandle, Scene},
    decision_tree::{DecisionTreeParams, DecisionTreeView},
    generate_rng,
    overview::OverviewView,
    random_forest::{ForestParams, RandomForestView},
    svm::{SvmParams, SvmView},
    AppConfig, FeatureId, FeatureTables,
};

const USAGE: &str = "\
Usage: forestry-ml <command> [args]

Commands:
  overview
  decision-tree     [feature] [depth] [min_samples]
  random-forest     [feature] [trees] [feature_split]
  svm               [feature] [kernel] [c] [gamma]
  knn               [k] [metric] [weights]
  neural-network    [layers] [neurons] [epochs] [learning_rate] [activation]
  gradient-boosting [n_estimators] [learning_rate] [max_depth] [subsample]
  analyses
  animate           [frames] [layers] [neurons]";

/// Positional arguments after the command name.
struct Args(Vec<String>);

impl Args {
    /// Parses the `idx`-th argument, or returns `default` when it is missing.
    fn get<T>(&self, idx: usize, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.0.get(idx) {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow!("invalid {name} {raw:?}: {e}")),
            None => Ok(default),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_analysis<A: Analysis>(analysis: A) -> Result<()> {
    let outcome = analysis::run_with(&analysis, |report| match serde_json::to_string(&report) {
        Ok(json) => log::info!("analysis complete: {json}"),
        Err(e) => log::warn!("could not encode analysis report: {e}"),
    })
    .await;
    print_json(&outcome)
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let mut argv = env::args().skip(1);
    let Some(command) = argv.next() else {
        eprintln!("{USAGE}");
        process::exit(1);
    };

    if let Err(e) = dispatch(&command, Args(argv.collect())).await {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

async fn dispatch(command: &str, args: Args) -> Result<()> {
    let config = AppConfig::from_env().context("loading config")?;
    let tables = FeatureTables::forestry();
    let mut rng = generate_rng(config.seed);

    match command {
        "overview" => print_json(&OverviewView::render()),
        "decision-tree" => {
            let feature: FeatureId = args.get(0, "feature", FeatureId::Height)?;
            let params = DecisionTreeParams::new(
                args.get(1, "depth", 3)?,
                args.get(2, "min_samples", 2)?,
            )?;
            let view = DecisionTreeView::render(&tables, feature, params);
            log::info!("{}", view.metrics);
            print_json(&view)
        }
        "random-forest" => {
            let feature: FeatureId = args.get(0, "feature", FeatureId::Height)?;
            let params =
                ForestParams::new(args.get(1, "trees", 5)?, args.get(2, "feature_split", 2)?)?;
            let view = RandomForestView::render(&tables, feature, params, &mut rng)?;
            log::info!("{}", view.metrics);
            print_json(&view)
        }
        "svm" => {
            let feature: FeatureId = args.get(0, "feature", FeatureId::Height)?;
            let params = SvmParams::new(
                args.get(1, "kernel", Default::default())?,
                args.get(2, "c", 1.0)?,
                args.get(3, "gamma", 0.1)?,
            )?;
            let view = SvmView::render(&tables, feature, params)?;
            log::info!("{}", view.performance);
            print_json(&view)
        }
        "knn" => {
            let params = KnnParams::new(
                args.get(0, "k", 5)?,
                args.get(1, "metric", Default::default())?,
                args.get(2, "weights", Default::default())?,
            )?;
            run_analysis(KnnAnalysis::new(params).with_delay(config.knn_delay())).await
        }
        "neural-network" => {
            let params = NeuralNetworkParams::new(
                args.get(0, "layers", 3)?,
                args.get(1, "neurons", 64)?,
                args.get(2, "epochs", 100)?,
                args.get(3, "learning_rate", 0.001)?,
                args.get(4, "activation", Default::default())?,
            )?;
            let analysis =
                NeuralNetworkAnalysis::new(params).with_delay(config.neural_network_delay());
            run_analysis(analysis).await
        }
        "gradient-boosting" => {
            let params = GradientBoostingParams::new(
                args.get(0, "n_estimators", 100)?,
                args.get(1, "learning_rate", 0.1)?,
                args.get(2, "max_depth", 3)?,
                args.get(3, "subsample", 1.0)?,
            )?;
            let analysis =
                GradientBoostingAnalysis::new(params).with_delay(config.gradient_boosting_delay());
            run_analysis(analysis).await
        }
        "analyses" => {
            let knn = KnnAnalysis::new(KnnParams::default()).with_delay(config.knn_delay());
            let nn = NeuralNetworkAnalysis::new(NeuralNetworkParams::default())
                .with_delay(config.neural_network_delay());
            let gb = GradientBoostingAnalysis::new(GradientBoostingParams::default())
                .with_delay(config.gradient_boosting_delay());

            let (knn, nn, gb) =
                futures::join!(analysis::run(&knn), analysis::run(&nn), analysis::run(&gb));
            print_json(&serde_json::json!({
                "knn": knn,
                "neuralNetwork": nn,
                "gradientBoosting": gb,
            }))
        }
        "animate" => {
            let frames: u64 = args.get(0, "frames", 60)?;
            let layers = args.get(1, "layers", 3)?;
            let neurons = args.get(2, "neurons", 64)?;
            let params = NeuralNetworkParams::new(layers, neurons, 100, 0.001, Default::default())?;

            let accuracy = NeuralNetworkAnalysis::new(params).compute()?.accuracy;
            let scene = Scene::build(
                params.layers(),
                params.neurons(),
                accuracy,
                config.canvas,
                &mut rng,
            );

            let mut handle = AnimationHandle::start(scene, config.frame_interval());
            let frame = handle.wait_for_tick(frames).await?;
            handle.stop().await?;
            print_json(&frame)
        }
        other => Err(anyhow!("unknown command {other:?}\n\n{USAGE}")),
    }
}
