use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use synthscore_core::{ColumnRole, load_table_csv};
use synthscore_metrics::{
    DistanceKind, EpsilonIdentifiability, Metric, MetricContext, MixedCorrelation,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1);
    let mut real_path: Option<PathBuf> = None;
    let mut synt_path: Option<PathBuf> = None;
    let mut cat_cols: Vec<String> = Vec::new();
    let mut num_cols: Vec<String> = Vec::new();
    let mut nn_dist = DistanceKind::Gower;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--real" => real_path = args.next().map(PathBuf::from),
            "--synt" => synt_path = args.next().map(PathBuf::from),
            "--cat" => {
                cat_cols = args
                    .next()
                    .map(|value| value.split(',').map(str::to_string).collect())
                    .unwrap_or_default();
            }
            "--num" => {
                num_cols = args
                    .next()
                    .map(|value| value.split(',').map(str::to_string).collect())
                    .unwrap_or_default();
            }
            "--nn-dist" => {
                nn_dist = match args.next() {
                    Some(keyword) => keyword.parse()?,
                    None => return Err("missing value for --nn-dist".into()),
                };
            }
            _ => return Err(format!("unexpected argument: {arg}").into()),
        }
    }

    let real_path = real_path.ok_or("missing --real path")?;
    let synt_path = synt_path.ok_or("missing --synt path")?;
    if num_cols.is_empty() {
        return Err("missing --num column list".into());
    }

    let mut roles = HashMap::new();
    for name in &cat_cols {
        roles.insert(name.clone(), ColumnRole::Categorical);
    }
    for name in &num_cols {
        roles.insert(name.clone(), ColumnRole::Numeric);
    }

    let real = load_table_csv(&real_path, &roles)?;
    let synt = load_table_csv(&synt_path, &roles)?;

    let mut ctx = MetricContext::new(&real, &synt, &cat_cols, &num_cols);
    ctx.nn_dist = nn_dist;

    let eps = EpsilonIdentifiability;
    let eps_results = eps.evaluate(&ctx)?;
    println!("{}", eps.format_output(&eps_results));

    let corr = MixedCorrelation::default();
    let corr_results = corr.evaluate(&ctx)?;
    println!("{}", corr.format_output(&corr_results));

    for (metric, score) in [
        (eps.name(), eps.normalize_output(&eps_results)),
        (corr.name(), corr.normalize_output(&corr_results)),
    ] {
        if let Some(score) = score {
            println!("{metric}: normalized={:?}", score.val);
        }
    }

    Ok(())
}
