mod display;
mod matching;
mod roster;
mod web;

use display::{print_draft, write_draft_to_file};
use matching::{generate_draft, HistoryRecord, RuleBucket};
use roster::load_roster;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args.get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| "admin123".to_string()); // Default password, change this!

        let initial_roster = if std::path::Path::new("data/roster.csv").exists() {
            load_roster("data/roster.csv")?
        } else {
            Vec::new()
        };

        println!("Starting web server on port {}...", port);
        println!("Admin password: {}", password);
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, password, initial_roster).await?;
        return Ok(());
    }

    // CLI mode: one matching round over the data files
    let roster_path = args.get(1).cloned().unwrap_or_else(|| "data/roster.csv".to_string());
    println!("Loading roster from {}...", roster_path);
    let roster = load_roster(&roster_path)?;
    println!(
        "Loaded {} members ({} participating this round)",
        roster.len(),
        roster.iter().filter(|p| p.is_participating).count()
    );

    let history: Vec<HistoryRecord> = if std::path::Path::new("data/history.json").exists() {
        serde_json::from_reader(std::fs::File::open("data/history.json")?)?
    } else {
        Vec::new()
    };
    let rules: Vec<RuleBucket> = if std::path::Path::new("data/rules.json").exists() {
        serde_json::from_reader(std::fs::File::open("data/rules.json")?)?
    } else {
        Vec::new()
    };
    if !history.is_empty() {
        println!("Avoiding repeats against {} published records", history.len());
    }
    if !rules.is_empty() {
        println!("Rule-based matching with {} buckets", rules.len());
    }

    println!("\n=== Running Matcher ===");
    let date_label = chrono::Local::now().format("%Y-%m-%d").to_string();
    let draft = generate_draft(&roster, &history, &rules, &mut rand::thread_rng());

    print_draft(&draft, &date_label);

    write_draft_to_file(&draft, &date_label, "draft.txt")?;
    println!("\nDraft written to draft.txt");

    Ok(())
}
