use std::{env, time::Duration};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use mr_common::{DoneResponse, JobInfo, JobResults, TaskCounts};
use reqwest::Client;

/// Igual que en el worker:
/// - En Docker: MASTER_URL=http://master:8080
/// - Local: default http://localhost:8080
fn master_base_url() -> String {
    env::var("MASTER_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

#[derive(Parser)]
#[command(name = "mr-client")]
#[command(about = "CLI simple para consultar el job MapReduce del master")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consulta el estado del job
    Status,
    /// Espera hasta que el job termine
    Wait {
        /// Intervalo entre consultas, en milisegundos
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Lista los archivos de salida ya publicados
    Results,
}

fn print_counts(label: &str, c: &TaskCounts) {
    if c.total == 0 {
        println!("  {label}: (sin tareas)");
        return;
    }
    let pct = (c.completed as f64 / c.total as f64) * 100.0;
    println!(
        "  {label}: total={}, libres={}, en curso={}, completadas={} ({:.1}%)",
        c.total, c.unallocated, c.in_progress, c.completed, pct
    );
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = master_base_url();

    match cli.command {
        Commands::Status => {
            let url = format!("{}/api/v1/job", base_url);
            let resp = client.get(&url).send().await?;
            if !resp.status().is_success() {
                bail!("error consultando {} (status {})", url, resp.status());
            }
            let job: JobInfo = resp.json().await?;

            println!("Job:");
            println!("  fase: {:?}", job.phase);
            println!("  n_reduce: {}", job.n_reduce);
            print_counts("map", &job.map_tasks);
            print_counts("reduce", &job.reduce_tasks);
            println!(
                "  leases activos: {}, reciclados: {}, reportes duplicados: {}",
                job.active_leases, job.recycled_tasks, job.duplicate_reports
            );
            println!("  iniciado: {}", job.started_at);
            if let Some(ref done) = job.finished_at {
                println!("  finalizado: {}", done);
            }
        }

        Commands::Wait { interval_ms } => {
            let url = format!("{}/api/v1/done", base_url);
            loop {
                let resp = client.get(&url).send().await?;
                if !resp.status().is_success() {
                    bail!("error consultando {} (status {})", url, resp.status());
                }
                let d: DoneResponse = resp.json().await?;
                if d.done {
                    println!("Job completo.");
                    break;
                }
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
            }
        }

        Commands::Results => {
            let url = format!("{}/api/v1/job/results", base_url);
            let resp = client.get(&url).send().await?;
            if !resp.status().is_success() {
                bail!("error consultando {} (status {})", url, resp.status());
            }
            let results: JobResults = resp.json().await?;
            println!("  directorio de salida: {}", results.output_dir);
            if results.files.is_empty() {
                println!("  (sin archivos de salida)");
            } else {
                println!("  archivos:");
                for f in results.files {
                    println!("    - {}", f);
                }
            }
        }
    }

    Ok(())
}
