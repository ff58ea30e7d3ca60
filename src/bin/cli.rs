use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fs;

#[derive(Parser)]
#[command(name = "quickdesk-cli")]
#[command(about = "CLI for the QuickDesk help desk", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Filtered, sorted, paginated ticket list.
    Dashboard {
        #[arg(short, long)]
        search: Option<String>,
        /// Open, "In Progress", Resolved, or Closed.
        #[arg(long)]
        status: Option<String>,
        /// Category id.
        #[arg(short, long)]
        category: Option<String>,
        /// Only tickets created by the logged-in account.
        #[arg(short, long)]
        mine: bool,
        /// recentlyModified or mostReplied.
        #[arg(long)]
        sort: Option<String>,
        #[arg(short, long)]
        page: Option<usize>,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Ticket detail with its conversation.
    Show {
        #[arg(short, long)]
        id: String,
    },
    Create {
        #[arg(short, long)]
        subject: String,
        /// Category id.
        #[arg(short, long)]
        category: String,
        #[arg(short, long)]
        description: String,
    },
    Comment {
        #[arg(short, long)]
        id: String,
        #[arg(short, long)]
        text: String,
    },
    Vote {
        #[arg(short, long)]
        id: String,
        /// up or down.
        #[arg(short, long)]
        direction: String,
    },
    SetStatus {
        #[arg(short, long)]
        id: String,
        #[arg(short, long)]
        status: String,
    },
    Categories,
    AddCategory {
        #[arg(short, long)]
        name: String,
    },
    Users,
    SetRole {
        #[arg(short, long)]
        id: String,
        #[arg(short, long)]
        role: String,
    },
    Logout,
}

#[derive(Deserialize)]
struct SessionResponse {
    token: String,
}

const TOKEN_FILE: &str = ".quickdesk_token";

fn token() -> String {
    fs::read_to_string(TOKEN_FILE).unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Register { email, password } => {
            let res = client
                .post(format!("{}/register", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            if res.status().is_success() {
                let body: SessionResponse = res.json().await?;
                fs::write(TOKEN_FILE, body.token)?;
                println!("Registered and logged in. Token saved to {TOKEN_FILE}");
            } else {
                println!("Registration failed: {}", res.text().await?);
            }
        }
        Commands::Login { email, password } => {
            let res = client
                .post(format!("{}/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            if res.status().is_success() {
                let body: SessionResponse = res.json().await?;
                fs::write(TOKEN_FILE, body.token)?;
                println!("Logged in. Token saved to {TOKEN_FILE}");
            } else {
                println!("Login failed: {}", res.text().await?);
            }
        }
        Commands::Dashboard {
            search,
            status,
            category,
            mine,
            sort,
            page,
            page_size,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(search) = search {
                query.push(("search", search));
            }
            if let Some(status) = status {
                query.push(("status", status));
            }
            if let Some(category) = category {
                query.push(("category", category));
            }
            if mine {
                query.push(("mine", "true".to_string()));
            }
            if let Some(sort) = sort {
                query.push(("sortBy", sort));
            }
            if let Some(page) = page {
                query.push(("page", page.to_string()));
            }
            if let Some(page_size) = page_size {
                query.push(("pageSize", page_size.to_string()));
            }
            let res = client
                .get(format!("{}/tickets", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .query(&query)
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Show { id } => {
            let res = client
                .get(format!("{}/tickets/{}", cli.url, id))
                .header("Authorization", format!("Bearer {}", token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Create {
            subject,
            category,
            description,
        } => {
            let res = client
                .post(format!("{}/tickets", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({
                    "subject": subject,
                    "description": description,
                    "category_id": category
                }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Comment { id, text } => {
            let res = client
                .post(format!("{}/tickets/{}/comments", cli.url, id))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({ "text": text }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Vote { id, direction } => {
            let res = client
                .post(format!("{}/tickets/{}/vote", cli.url, id))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({ "direction": direction }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::SetStatus { id, status } => {
            let res = client
                .patch(format!("{}/tickets/{}", cli.url, id))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({ "status": status }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Categories => {
            let res = client
                .get(format!("{}/categories", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::AddCategory { name } => {
            let res = client
                .post(format!("{}/categories", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({ "name": name }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Users => {
            let res = client
                .get(format!("{}/users", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::SetRole { id, role } => {
            let res = client
                .patch(format!("{}/users/{}/role", cli.url, id))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({ "role": role }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Logout => {
            let _ = fs::remove_file(TOKEN_FILE);
            println!("Logged out (token removed).");
        }
    }

    Ok(())
}
