//! DontQ CLI - command-line client for the DontQ queue service

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::ApiClient;
use colored::Colorize;
use serde_json::{json, Value};
use tabled::{Table, Tabled};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "dontq-cli")]
#[command(about = "DontQ virtual queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API server URL
    #[arg(long, env = "DONTQ_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Act as this user (sent as x-user-id)
    #[arg(short, long, env = "DONTQ_USER")]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the daemon is up
    Status,

    /// List active queues, busiest first
    List {
        #[arg(short, long)]
        category: Option<String>,

        /// Match name, description or location
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Create a queue you operate
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        capacity: i64,

        /// Minutes per served customer
        #[arg(long)]
        service_time: i64,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Position that triggers the "approaching the front" message
        #[arg(long)]
        notify_position: Option<i64>,
    },

    /// Show one queue and your place in it
    Show { queue_id: String },

    /// Look up a queue by its 6-digit code
    Find { short_id: String },

    Join { queue_id: String },

    Leave { queue_id: String },

    /// Operator view of the roster
    Manage { queue_id: String },

    /// Operator: remove a customer who did not turn up
    NoShow { queue_id: String, entry_id: String },

    /// Operator: mark a customer as served
    Serve { queue_id: String, entry_id: String },

    /// Operator: enqueue a registered user by their short id
    AddKnown { queue_id: String, short_id: String },

    /// Operator: change minutes per customer
    ServiceTime { queue_id: String, minutes: i64 },

    /// Operator: recent departures
    Archive {
        queue_id: String,

        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Show or update your profile
    Profile {
        #[arg(long)]
        name: Option<String>,

        /// Phone number for WhatsApp notifications ("" clears it)
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "Code")]
    short_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Waiting")]
    waiting: String,
    #[tabled(rename = "Wait (min)")]
    total_wait: i64,
    #[tabled(rename = "ID")]
    id: String,
}

impl QueueRow {
    fn from_json(q: &Value) -> Self {
        Self {
            short_id: text(&q["short_id"]),
            name: text(&q["name"]),
            category: text(&q["category"]),
            waiting: format!("{}/{}", q["current_queue"], q["max_capacity"]),
            total_wait: q["total_estimated_time"].as_i64().unwrap_or(0),
            id: text(&q["id"]),
        }
    }
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    position: i64,
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Wait (min)")]
    wait: i64,
    #[tabled(rename = "Entry ID")]
    id: String,
}

impl EntryRow {
    fn from_json(e: &Value) -> Self {
        Self {
            position: e["position"].as_i64().unwrap_or(0),
            user_id: text(&e["user_id"]),
            wait: e["estimated_wait_time"].as_i64().unwrap_or(0),
            id: text(&e["id"]),
        }
    }
}

fn text(v: &Value) -> String {
    v.as_str().unwrap_or("-").to_string()
}

fn print_queue(queue: &Value) {
    println!(
        "{} {}",
        text(&queue["name"]).cyan().bold(),
        format!("[{}]", text(&queue["short_id"])).dimmed()
    );
    println!("  {} {}", "ID:".bold(), text(&queue["id"]));
    println!("  {} {}", "Category:".bold(), text(&queue["category"]));
    println!(
        "  {} {}/{}",
        "Waiting:".bold(),
        queue["current_queue"],
        queue["max_capacity"]
    );
    println!(
        "  {} {} min per customer, {} min total",
        "Service:".bold(),
        queue["est_time_to_serve"],
        queue["total_estimated_time"]
    );
    println!("  {} {}", "Served:".bold(), queue["total_served"]);
}

fn print_departure(result: &Value) {
    println!("{}", format!("✓ {}", text(&result["message"])).green().bold());
    println!(
        "  {} {}   {} {}   {} {} min",
        "Waiting:".bold(),
        result["current_queue"],
        "Served:".bold(),
        result["total_served"],
        "Total wait:".bold(),
        result["total_estimated_time"]
    );
}

fn print_join(result: &Value) {
    println!("{}", format!("✓ {}", text(&result["message"])).green().bold());
    println!(
        "  {} {}   {} {} min",
        "Position:".bold(),
        result["userPosition"],
        "Estimated wait:".bold(),
        result["estWaitTime"]
    );
    println!("  {} {}", "Entry ID:".bold(), text(&result["queueEntry"]["id"]));
}

fn list_query(category: Option<String>, search: Option<String>, limit: Option<i64>) -> String {
    let mut params = Vec::new();
    if let Some(c) = category {
        params.push(format!("category={}", encode(&c)));
    }
    if let Some(s) = search {
        params.push(format!("search={}", encode(&s)));
    }
    if let Some(l) = limit {
        params.push(format!("limit={}", l));
    }
    if params.is_empty() {
        "/queues".to_string()
    } else {
        format!("/queues?{}", params.join("&"))
    }
}

/// Percent-encode a query value
fn encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.api_url, cli.user.clone());

    match cli.command {
        Commands::Status => match api.get("/health").await {
            Ok(health) => {
                println!("  {} {}", "API URL:".bold(), cli.api_url);
                println!("  {} {}", "Status:".bold(), "ONLINE".green());
                println!("  {} {}", "Version:".bold(), text(&health["version"]));
            }
            Err(e) => {
                println!("  {} {}", "Status:".bold(), "ERROR".red());
                println!("  {} {}", "Error:".bold(), e);
            }
        },

        Commands::List {
            category,
            search,
            limit,
        } => {
            let queues = api.get(&list_query(category, search, limit)).await?;
            let rows: Vec<QueueRow> = queues
                .as_array()
                .map(|qs| qs.iter().map(QueueRow::from_json).collect())
                .unwrap_or_default();
            if rows.is_empty() {
                println!("{}", "No active queues".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }

        Commands::Create {
            name,
            capacity,
            service_time,
            category,
            location,
            description,
            notify_position,
        } => {
            let body = json!({
                "name": name,
                "maxCapacity": capacity,
                "estTimeToServe": service_time,
                "category": category,
                "location": location,
                "description": description,
                "notifyPosition": notify_position,
            });
            let queue = api.post("/queues", Some(body)).await?;
            println!("{}", "✓ Queue created".green().bold());
            println!();
            print_queue(&queue);
        }

        Commands::Show { queue_id } => {
            let view = api.get(&format!("/queues/{}", queue_id)).await?;
            print_queue(&view["queue"]);
            if let Some(entry) = view["my_entry"].as_object() {
                println!();
                println!(
                    "  {} position {}, about {} min",
                    "You:".bold(),
                    entry.get("position").cloned().unwrap_or(Value::Null),
                    entry.get("estimated_wait_time").cloned().unwrap_or(Value::Null)
                );
            }
        }

        Commands::Find { short_id } => {
            let queue = api.get(&format!("/queues/short/{}", short_id)).await?;
            print_queue(&queue);
        }

        Commands::Join { queue_id } => {
            let result = api.post(&format!("/queues/{}/join", queue_id), None).await?;
            print_join(&result);
        }

        Commands::Leave { queue_id } => {
            let result = api.post(&format!("/queues/{}/leave", queue_id), None).await?;
            print_departure(&result);
        }

        Commands::Manage { queue_id } => {
            let management = api.get(&format!("/queues/{}/manage", queue_id)).await?;
            print_queue(&management["queue"]);
            println!();
            let rows: Vec<EntryRow> = management["roster"]
                .as_array()
                .map(|es| es.iter().map(EntryRow::from_json).collect())
                .unwrap_or_default();
            if rows.is_empty() {
                println!("{}", "Nobody is waiting".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }

        Commands::NoShow { queue_id, entry_id } => {
            let path = format!("/queues/{}/customers/{}/no-show", queue_id, entry_id);
            print_departure(&api.post(&path, None).await?);
        }

        Commands::Serve { queue_id, entry_id } => {
            let path = format!("/queues/{}/customers/{}/serve", queue_id, entry_id);
            print_departure(&api.post(&path, None).await?);
        }

        Commands::AddKnown { queue_id, short_id } => {
            let result = api
                .post(
                    &format!("/queues/{}/add-known", queue_id),
                    Some(json!({ "shortId": short_id })),
                )
                .await?;
            print_join(&result);
        }

        Commands::ServiceTime { queue_id, minutes } => {
            let queue = api
                .put(
                    &format!("/queues/{}/service-time", queue_id),
                    json!({ "est_time_to_serve": minutes }),
                )
                .await?;
            println!("{}", "✓ Service time updated".green().bold());
            print_queue(&queue);
        }

        Commands::Archive { queue_id, limit } => {
            let path = match limit {
                Some(l) => format!("/queues/{}/archive?limit={}", queue_id, l),
                None => format!("/queues/{}/archive", queue_id),
            };
            let rows = api.get(&path).await?;
            for row in rows.as_array().into_iter().flatten() {
                println!(
                    "  {:<8} {:<24} waited {} min",
                    text(&row["status"]),
                    text(&row["user_id"]),
                    row["wait_time"]
                );
            }
        }

        Commands::Profile { name, phone } => {
            let profile = if name.is_none() && phone.is_none() {
                api.get("/users/me/profile").await?
            } else {
                let mut body = serde_json::Map::new();
                if let Some(name) = name {
                    body.insert("name".to_string(), Value::String(name));
                }
                if let Some(phone) = phone {
                    body.insert("phoneNumber".to_string(), Value::String(phone));
                }
                api.put("/users/me/profile", Value::Object(body)).await?
            };
            println!("  {} {}", "User:".bold(), text(&profile["user_id"]));
            println!("  {} {}", "Name:".bold(), text(&profile["name"]));
            println!("  {} {}", "Phone:".bold(), text(&profile["phone_number"]));
            println!("  {} {}", "Short ID:".bold(), text(&profile["short_id"]).cyan());
        }
    }

    Ok(())
}
