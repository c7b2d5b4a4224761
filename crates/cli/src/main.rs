use anyhow::{bail, Context, Result};
use catalog::{Catalog, DataSet, Pool, QuestionBank, TasteAxis, TasteVector};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use engine::{build_user_profile, parse_answers, MixerConfig, Passthrough, ShortRecipePolicy, UserProfile};
use rand::Rng;
use recommender::{
    AlcoholPolicy, AlcoholPreference, Recommendation, RecommendationOrchestrator,
    DEFAULT_ALCOHOLIC_SHARE, DEFAULT_TOTAL_VOLUME,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Mixology - drink recommendations from your taste
#[derive(Parser)]
#[command(name = "mixology")]
#[command(about = "Drink recommendation engine using least-squares mixing", long_about = None)]
struct Cli {
    /// Directory holding ingredients.json and questions.json
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Mix spirits and mixers separately (30/70 by default)
    Split,
    /// Mix everything in one pool
    Union,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a drink
    Recommend {
        /// Questionnaire answers in question order, e.g. "1,2,1,,2"
        #[arg(long, conflicts_with = "taste")]
        answers: Option<String>,

        /// Taste given directly, e.g. "0.4 sweet, 0.8 sour"
        #[arg(long)]
        taste: Option<String>,

        /// Alcohol preference: "a" (alcoholic) or "n" (non-alcoholic)
        #[arg(long, default_value = "n")]
        preference: AlcoholPreference,

        /// Maximum number of ingredients (values below 1 count as 1)
        #[arg(short, long, default_value_t = 3, allow_negative_numbers = true)]
        k: i64,

        /// Total drink volume in ml
        #[arg(long, default_value_t = DEFAULT_TOTAL_VOLUME)]
        volume: f64,

        /// How alcoholic drinks are mixed
        #[arg(long, value_enum, default_value = "split")]
        policy: PolicyArg,

        /// Alcoholic share of volume and ingredients in split mode
        #[arg(long, default_value_t = DEFAULT_ALCOHOLIC_SHARE)]
        share: f64,

        /// Fill short recipes up to k with zero-volume entries
        #[arg(long)]
        pad: bool,

        /// Mix the raw profile without autoencoder reconstruction
        #[arg(long)]
        no_reconstruct: bool,

        /// Print the recommendation as JSON
        #[arg(long)]
        json: bool,
    },

    /// List or search ingredients
    Ingredients {
        /// Case-insensitive substring of the ingredient name
        #[arg(long)]
        search: Option<String>,

        /// Only alcoholic ingredients
        #[arg(long, conflicts_with = "non_alcoholic")]
        alcoholic: bool,

        /// Only non-alcoholic ingredients
        #[arg(long)]
        non_alcoholic: bool,
    },

    /// Show the questionnaire
    Questions,

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Ingredient count per request
        #[arg(short, long, default_value = "3")]
        k: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let data = DataSet::load_from_dir(&cli.data_dir)
        .with_context(|| format!("Failed to load drink data from {}", cli.data_dir.display()))?;
    info!("Loaded data set in {:?}", start.elapsed());

    match cli.command {
        Commands::Recommend {
            answers,
            taste,
            preference,
            k,
            volume,
            policy,
            share,
            pad,
            no_reconstruct,
            json,
        } => {
            let profile = build_profile(&data.questions, answers.as_deref(), taste.as_deref())?;
            let policy = match policy {
                PolicyArg::Split => AlcoholPolicy::Split {
                    alcoholic_share: share,
                },
                PolicyArg::Union => AlcoholPolicy::Union,
            };
            let short_recipe = if pad {
                ShortRecipePolicy::PadWithZeros
            } else {
                ShortRecipePolicy::Truncate
            };

            let mut orchestrator = RecommendationOrchestrator::new(Arc::new(data.catalog))
                .with_policy(policy)
                .with_mixer_config(MixerConfig::default().with_short_recipe(short_recipe));
            if no_reconstruct {
                orchestrator = orchestrator.with_reconstructor(Passthrough);
            }

            let k = k.max(1) as usize;
            handle_recommend(&orchestrator, &profile, preference, k, volume, json)?
        }
        Commands::Ingredients {
            search,
            alcoholic,
            non_alcoholic,
        } => {
            let pool = match (alcoholic, non_alcoholic) {
                (true, _) => Pool::Alcoholic,
                (_, true) => Pool::NonAlcoholic,
                _ => Pool::All,
            };
            handle_ingredients(&data.catalog, search.as_deref(), pool)
        }
        Commands::Questions => handle_questions(&data.questions),
        Commands::Benchmark {
            requests,
            concurrent,
            k,
        } => handle_benchmark(Arc::new(data.catalog), requests, concurrent, k).await?,
    }

    Ok(())
}

/// Profile from `--taste`, else from `--answers`, else the zero profile
fn build_profile(
    questions: &QuestionBank,
    answers: Option<&str>,
    taste: Option<&str>,
) -> Result<UserProfile> {
    if let Some(taste) = taste {
        let taste: TasteVector = taste.parse().context("Failed to parse --taste")?;
        return Ok(UserProfile::from_taste(taste));
    }

    let answers = parse_answers(answers.unwrap_or_default());
    let profile = build_user_profile(questions, &answers);
    if profile.valid_answers == 0 {
        warn!("No valid answers given, using a neutral taste profile");
    }
    Ok(profile)
}

/// Handle the 'recommend' command
fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    profile: &UserProfile,
    preference: AlcoholPreference,
    k: usize,
    volume: f64,
    json: bool,
) -> Result<()> {
    let recommendation = orchestrator
        .recommend_for(profile, preference, k, volume)
        .with_context(|| format!("No {} drink could be mixed", preference))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        print_recommendation(profile, preference, &recommendation);
    }
    Ok(())
}

/// Handle the 'ingredients' command
fn handle_ingredients(catalog: &Catalog, search: Option<&str>, pool: Pool) {
    let needle = search.map(str::to_lowercase);
    let matches: Vec<_> = catalog
        .pool(pool)
        .iter()
        .filter(|ingredient| match &needle {
            Some(needle) => ingredient.name.to_lowercase().contains(needle),
            None => true,
        })
        .collect();

    let header: Vec<String> = TasteAxis::ALL.iter().map(|axis| format!("{:>7}", axis.name())).collect();
    println!(
        "{}",
        format!("{:<22}{}  alcoholic", "Ingredient", header.join("")).bold().blue()
    );
    for ingredient in &matches {
        let values: Vec<String> = ingredient
            .taste
            .iter()
            .map(|(_, value)| format!("{:>7.2}", value))
            .collect();
        let flag = if ingredient.alcoholic { "yes".red() } else { "no".green() };
        println!("{:<22}{}  {}", ingredient.name, values.join(""), flag);
    }
    println!("{} {} ingredients ({})", "•".cyan(), matches.len(), pool);
}

/// Handle the 'questions' command
fn handle_questions(questions: &QuestionBank) {
    println!("{}", "Questionnaire:".bold().blue());
    for (i, question) in questions.iter().enumerate() {
        println!("{}. {}", (i + 1).to_string().green(), question.prompt);
        println!("   1) {}  {}", question.option_a.text, question.option_a.taste);
        println!("   2) {}  {}", question.option_b.text, question.option_b.taste);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: Arc<Catalog>,
    requests: usize,
    concurrent: usize,
    k: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("Benchmark needs at least one request");
    }
    let orchestrator = RecommendationOrchestrator::new(catalog);

    // Random profiles, alternating alcohol preference
    let workload: Vec<(TasteVector, AlcoholPreference)> = {
        let mut rng = rand::rng();
        (0..requests)
            .map(|i| {
                let taste = TasteVector::from_fn(|_| rng.random_range(0.0..=1.0));
                let preference = if i % 2 == 0 {
                    AlcoholPreference::Alcoholic
                } else {
                    AlcoholPreference::NonAlcoholic
                };
                (taste, preference)
            })
            .collect()
    };

    let limiter = Arc::new(Semaphore::new(concurrent.max(1)));
    let bench_start = Instant::now();

    // Reconstruction is CPU-bound: run each request on the blocking pool
    let mut handles = vec![];
    for (taste, preference) in workload {
        let orchestrator = orchestrator.clone();
        let limiter = limiter.clone();
        let handle = tokio::spawn(async move {
            let _permit = limiter.acquire_owned().await?;
            let elapsed = tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                orchestrator.recommend(&taste, preference, k, DEFAULT_TOTAL_VOLUME)?;
                Ok::<_, anyhow::Error>(start.elapsed())
            })
            .await??;
            Ok::<_, anyhow::Error>(elapsed)
        });
        handles.push(handle);
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall_time = bench_start.elapsed();

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f64| {
        let idx = ((timings.len() as f64 * p) as usize).min(timings.len() - 1);
        timings[idx]
    };
    let throughput = requests as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent, k={})", requests, concurrent.max(1), k);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print a recommendation
fn print_recommendation(
    profile: &UserProfile,
    preference: AlcoholPreference,
    recommendation: &Recommendation,
) {
    println!("{}", "---------- RESULT ----------".bold().blue());
    println!(
        "{}Your profile: {} ({} answers)",
        "• ".green(),
        profile.taste,
        profile.valid_answers
    );
    for sub_mix in &recommendation.sub_mixes {
        println!(
            "{}Reconstructed ({}): {}",
            "• ".green(),
            sub_mix.pool,
            sub_mix.profile
        );
    }
    if let Some(closest) = &recommendation.closest_ingredient {
        println!("{}Closest single ingredient: {}", "• ".cyan(), closest);
    }

    let title = match preference {
        AlcoholPreference::Alcoholic => "Alcoholic cocktail:",
        AlcoholPreference::NonAlcoholic => "Non-alcoholic cocktail:",
    };
    println!("{}", title.bold());
    print!("{}", recommendation.recipe.rounded(2));
    println!(
        "{}Total: {:.2} ml",
        "• ".cyan(),
        recommendation.total_volume()
    );
}
