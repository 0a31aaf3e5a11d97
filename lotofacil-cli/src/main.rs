mod config;
mod delivery;
mod display;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::display::{
    display_check, display_combinations, display_companions, display_draws, display_frequencies,
    display_gaps, display_import_summary, display_trained,
};
use lotofacil_db::db::{count_draws, fetch_all_draws, fetch_first_payload, fetch_last_draws, migrate, open_db};
use lotofacil_db::rusqlite::Connection;
use lotofacil_db::source::SqliteStore;
use lotofacil_engine::companions::find_most_frequent_companions;
use lotofacil_engine::error::degrade;
use lotofacil_engine::frequency::count_number_frequencies;
use lotofacil_engine::gaps::calculate_average_gap;
use lotofacil_engine::heuristic::{predict_next_combinations, seeded_rng};
use lotofacil_engine::report::run_report;
use lotofacil_engine::trained::train_and_predict_combinations;

const EMPTY_DB: &str = "Base vide. Lancez d'abord : lotofacil import";

#[derive(Parser)]
#[command(name = "lotofacil", about = "Statistiques et combinaisons candidates Lotofácil")]
#[command(version)]
struct Cli {
    /// Fichier de configuration TOML (ignoré s'il n'existe pas)
    #[arg(long, default_value = "./lotofacil.toml")]
    config: PathBuf,

    /// Chemin de la base SQLite (prioritaire sur la configuration)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Niveau de log si RUST_LOG n'est pas défini
    #[arg(long)]
    log_level: Option<String>,

    /// Logs au format JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer des tirages depuis un fichier CSV (séparateur ';') ou JSON
    Import {
        /// Chemin vers le fichier
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher les statistiques (fréquences, écarts, compagnons)
    Stats {
        /// Nombre de numéros affichés dans le tableau des compagnons
        #[arg(short, long, default_value = "15")]
        top: usize,
    },

    /// Générer des combinaisons candidates
    Predict {
        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Produire le rapport JSON complet
    Report {
        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Écrire le rapport dans un fichier plutôt que sur la sortie standard
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Envoyer le rapport à l'API configurée
        #[arg(long)]
        send: bool,
    },

    /// Vérifier l'accès à la base et le format du premier tirage
    Check,
}

fn init_logging(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Chargement de {:?}", cli.config))?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level, cli.json_logs);
    tracing::debug!(db = ?config.db_path, "configuration chargée");

    if let Command::DbPath = cli.command {
        println!("{}", config.db_path.display());
        return Ok(());
    }

    let conn = open_db(&config.db_path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => Ok(()),
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { top } => cmd_stats(&conn, &config, top),
        Command::Predict { seed } => cmd_predict(&conn, &config, seed),
        Command::Report { seed, output, send } => cmd_report(&conn, &config, seed, output.as_deref(), send),
        Command::Check => cmd_check(&conn, &config.db_path),
    }
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_file(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    if count_draws(conn)? == 0 {
        println!("{EMPTY_DB}");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, config: &AppConfig, top: usize) -> Result<()> {
    let draws = fetch_all_draws(conn)?;
    if draws.is_empty() {
        println!("{EMPTY_DB}");
        return Ok(());
    }

    let frequencies = count_number_frequencies(&draws);
    display_frequencies(&frequencies, draws.len());

    let gaps = calculate_average_gap(&draws);
    display_gaps(&gaps);

    let companions = find_most_frequent_companions(&draws, &frequencies, config.analysis.companion_limit)?;
    display_companions(&companions, top);
    Ok(())
}

fn cmd_predict(conn: &Connection, config: &AppConfig, seed: Option<u64>) -> Result<()> {
    let draws = fetch_all_draws(conn)?;
    if draws.is_empty() {
        println!("{EMPTY_DB}");
        return Ok(());
    }

    let settings = config.analysis.settings();
    let frequencies = count_number_frequencies(&draws);
    let companions = degrade(
        "companions",
        find_most_frequent_companions(&draws, &frequencies, settings.companion_limit),
    );
    let gaps = calculate_average_gap(&draws);

    let mut rng = seeded_rng(seed);
    let combinations = predict_next_combinations(
        &frequencies,
        &companions,
        &gaps,
        settings.heuristic_count,
        &mut rng,
    );
    display_combinations("Combinaisons heuristiques", &combinations);

    let trained = train_and_predict_combinations(&draws, &settings.model);
    display_trained(&trained);
    Ok(())
}

fn cmd_report(
    conn: &Connection,
    config: &AppConfig,
    seed: Option<u64>,
    output: Option<&Path>,
    send: bool,
) -> Result<()> {
    let store = SqliteStore::new(conn);
    let response = run_report(&store, &config.analysis.settings(), seed);
    let json = serde_json::to_string_pretty(&response).context("Sérialisation du rapport")?;

    match output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("Écriture de {:?}", path))?;
            tracing::info!(path = ?path, "rapport écrit");
        }
        None => println!("{json}"),
    }

    let Some(report) = response.report() else {
        bail!("Rapport en échec (statusCode {})", response.status_code);
    };

    if send {
        delivery::deliver(report, &config.api);
    }
    Ok(())
}

fn cmd_check(conn: &Connection, db_path: &Path) -> Result<()> {
    let count = count_draws(conn)?;
    let first = fetch_first_payload(conn)?
        .map(|payload| serde_json::from_str::<serde_json::Value>(&payload))
        .transpose()
        .context("Premier tirage illisible")?;
    display_check(db_path, count, first.as_ref());
    Ok(())
}
