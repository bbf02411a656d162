use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    config::load_settings, CarApi, CarListClient, ConfirmPrompt, DeleteOutcome, FailureSink,
    FormField, HttpCarApi, NoticeLevel,
};
use shared::domain::Car;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "car_roster", about = "Manage the cars stored in the car database")]
struct Cli {
    /// Base url of the car api; overrides config file and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every car.
    List,
    /// Add a car. Numbers are sent as typed; unparseable ones go out as null.
    Add {
        #[arg(long)]
        model: String,
        #[arg(long)]
        year: String,
        #[arg(long)]
        color: String,
        #[arg(long)]
        price: String,
    },
    /// Replace a car's fields; fields left out keep their current value.
    Update {
        id: String,
        #[command(flatten)]
        fields: FieldOverrides,
    },
    /// Delete a car after confirmation.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
struct FieldOverrides {
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    price: Option<String>,
}

impl FieldOverrides {
    fn into_pairs(self) -> Vec<(FormField, String)> {
        [
            (FormField::Model, self.model),
            (FormField::Year, self.year),
            (FormField::Color, self.color),
            (FormField::Price, self.price),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

fn confirm_on_stdin(message: &str) -> bool {
    print!("{message} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_cars(cars: &[Car]) {
    if cars.is_empty() {
        println!("No cars yet.");
        return;
    }
    for car in cars {
        println!("[{}] {}", car.id, car.title());
        println!("    {}", car.color_label());
        println!("    {}", car.price_label());
    }
}

/// Fetches the list and picks the car whose id prints as `id`.
async fn find_car<A: CarApi, S: FailureSink>(
    client: &mut CarListClient<A, S>,
    id: &str,
) -> Result<Car> {
    client
        .list()
        .await
        .iter()
        .find(|car| car.id.to_string() == id)
        .cloned()
        .ok_or_else(|| anyhow!("no car with id {id}"))
}

async fn run<A: CarApi, S: FailureSink>(
    client: &mut CarListClient<A, S>,
    command: Command,
    prompt: &dyn ConfirmPrompt,
) -> Result<()> {
    match command {
        Command::List => {
            client.list().await;
        }
        Command::Add {
            model,
            year,
            color,
            price,
        } => {
            for (field, value) in [
                (FormField::Model, model),
                (FormField::Year, year),
                (FormField::Color, color),
                (FormField::Price, price),
            ] {
                client.set_field(field, value);
            }
            client.submit().await.context("failed to add car")?;
        }
        Command::Update { id, fields } => {
            let car = find_car(client, &id).await?;
            client.begin_edit(&car);
            for (field, value) in fields.into_pairs() {
                client.set_field(field, value);
            }
            client.submit().await.context("failed to update car")?;
        }
        Command::Delete { id, yes } => {
            let car = find_car(client, &id).await?;
            let outcome = if yes {
                client.delete(&car.id, &|_: &str| true).await
            } else {
                client.delete(&car.id, prompt).await
            }
            .context("failed to delete car")?;
            if outcome == DeleteOutcome::Declined {
                println!("Delete cancelled.");
                return Ok(());
            }
        }
    }

    print_cars(client.cars());
    Ok(())
}

fn report_notices<A: CarApi, S: FailureSink>(client: &CarListClient<A, S>) -> bool {
    let mut failed = false;
    for notice in client.state().notices() {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Error => {
                failed = true;
                eprintln!("error: {}", notice.message);
            }
        }
    }
    failed
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings()
        .context("failed to load settings")?
        .with_api_base_url(cli.api_url)
        .context("invalid --api-url")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    tracing::debug!(api_base_url = %settings.api_base_url, "starting car_roster");

    let api = HttpCarApi::from_settings(&settings)?;
    let mut client = CarListClient::new(api);
    let result = run(&mut client, cli.command, &confirm_on_stdin).await;
    let had_errors = report_notices(&client);

    result?;
    if had_errors {
        bail!("car api call failed");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
