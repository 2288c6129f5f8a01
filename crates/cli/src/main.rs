use aggregator::Aggregator;
use anyhow::Result;
use chat::{
    ChatEvent, ChatFeed, ChatService, MemoryMessageStore, MessageStore, RestMessageStore,
    SendOutcome,
};
use clap::{Parser, Subcommand};
use common::{AppContext, Config};
use console::style;
use domain::{Category, Opportunity};
use llm::GeminiGenerator;
use sources::{curated, OpportunitySeeder};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "oppgenie")]
#[command(about = "Discover internships, fellowships, and volunteer roles")]
#[command(version)]
struct Cli {
    /// Conversation owner id (defaults to $OPPGENIE_USER, then "local-user")
    #[arg(long, global = true)]
    user: Option<String>,

    /// Keep chat history in memory instead of the backend store
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse all listings, optionally filtered by location
    List {
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Full-text search across every source
    Search { query: String },
    /// Listings currently marked as trending
    Trending,
    /// Listings in one category (Technology, Education, Healthcare, Social,
    /// Environment, Global)
    Category { name: String },
    /// Ask the assistant (one-shot with a message, interactive without)
    Chat { message: Option<String> },
    /// Delete the current user's chat history
    Clear,
    /// Seed the backend opportunity collection with the curated catalog
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    common::logging::init("warn");

    let cli = Cli::parse();
    let mut ctx = AppContext::initialize(Config::from_env());

    let user_id = cli
        .user
        .clone()
        .or_else(|| std::env::var("OPPGENIE_USER").ok())
        .unwrap_or_else(|| "local-user".to_string());
    ctx.login(user_id, None);
    let owner = ctx.user().map(|u| u.user_id.clone()).unwrap_or_default();

    match cli.command {
        Commands::List { location } => {
            let agg = build_aggregator(&ctx)?;
            render_listings(&agg.fetch_all("", &location).await?);
        }
        Commands::Search { query } => {
            let agg = build_aggregator(&ctx)?;
            render_listings(&agg.search(&query).await?);
        }
        Commands::Trending => {
            let agg = build_aggregator(&ctx)?;
            render_listings(&agg.trending().await?);
        }
        Commands::Category { name } => {
            let category: Category = name.parse()?;
            let agg = build_aggregator(&ctx)?;
            render_listings(&agg.by_category(category).await?);
        }
        Commands::Chat { message } => {
            let store = build_store(&ctx, cli.offline)?;
            let service = build_chat(&ctx, Arc::clone(&store))?;
            match message {
                Some(message) => render_outcome(service.send(&owner, &message).await),
                None => interactive_chat(store, service, &owner).await?,
            }
        }
        Commands::Clear => {
            let store = build_store(&ctx, cli.offline)?;
            let service = build_chat(&ctx, store)?;
            match service.clear(&owner).await {
                Ok(count) => println!("{} ({count} messages)", chat::service::CLEARED_NOTICE),
                Err(e) => println!("{}: {e}", chat::service::CLEAR_FAILED_NOTICE),
            }
        }
        Commands::Seed => {
            let seeder = OpportunitySeeder::new(&ctx.config.backend_base_url)?;
            let inserted = seeder.seed(&curated::catalog()).await?;
            println!("Seeded {inserted} opportunities");
        }
    }

    ctx.logout();
    Ok(())
}

fn build_aggregator(ctx: &AppContext) -> Result<Aggregator> {
    Ok(Aggregator::new(sources::default_sources(
        &ctx.config.backend_base_url,
    )?))
}

fn build_store(ctx: &AppContext, offline: bool) -> Result<Arc<dyn MessageStore>> {
    if offline {
        Ok(Arc::new(MemoryMessageStore::new()))
    } else {
        Ok(Arc::new(RestMessageStore::new(
            &ctx.config.backend_base_url,
        )?))
    }
}

fn build_chat(ctx: &AppContext, store: Arc<dyn MessageStore>) -> Result<ChatService> {
    let api_key = ctx.config.gemini_api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; the assistant will serve fallback responses");
    }
    let generator = Arc::new(GeminiGenerator::new(api_key)?);
    Ok(ChatService::new(store, generator))
}

async fn interactive_chat(
    store: Arc<dyn MessageStore>,
    service: ChatService,
    owner: &str,
) -> Result<()> {
    // Render whatever history the store already holds, then detach: replies
    // are printed straight from the send outcome below.
    let mut feed = ChatFeed::subscribe(store, owner);
    match feed.next_event().await {
        Some(ChatEvent::Snapshot(messages)) => {
            for message in &messages {
                println!(
                    "{} {}",
                    style(format!("{}>", message.role)).dim(),
                    message.content
                );
            }
        }
        Some(ChatEvent::ConnectionLost { notice }) => {
            println!("{} {notice}", style("!").red());
        }
        _ => {}
    }
    feed.unsubscribe();

    println!(
        "{}",
        style("Ask OppGenie about opportunities (exit to quit)").bold()
    );
    let stdin = io::stdin();
    loop {
        print!("{} ", style("you>").cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        render_outcome(service.send(owner, line).await);
    }
    Ok(())
}

fn render_outcome(outcome: SendOutcome) {
    match outcome {
        SendOutcome::Delivered { reply } => {
            println!("{} {reply}", style("genie>").green());
        }
        SendOutcome::NotSent { notice } => {
            println!("{} {notice}", style("!").red());
        }
        SendOutcome::ReplyNotSaved { reply, notice } => {
            println!("{} {reply}", style("genie>").green());
            println!("{} {notice}", style("!").yellow());
        }
    }
}

fn render_listings(listings: &[Opportunity]) {
    if listings.is_empty() {
        println!("No opportunities found.");
        return;
    }

    for opp in listings {
        println!(
            "{} {}",
            style(&opp.title).bold(),
            style(format!("[{}]", opp.kind)).dim()
        );
        println!(
            "   {} | {} | due {}",
            opp.organization,
            opp.location.as_deref().unwrap_or("Anywhere"),
            opp.deadline
        );
        println!("   {}", style(&opp.link).underlined());
    }
    println!("{}", style(format!("{} listings", listings.len())).dim());
}
