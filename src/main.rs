//! Command-line front end for the tacomail disposable email service.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use regex::RegexBuilder;
use std::io::{BufRead, Write};
use std::time::Duration;
use tacomail_client::{
    CancellationToken, Client, Email, Session, WaitOptions, WaitOutcome,
};

#[derive(Parser, Debug)]
#[command(
    name = "tacomail",
    version,
    about = "Command-line interface for the tacomail disposable email service"
)]
struct Cli {
    /// Base URL of the tacomail instance.
    #[arg(long, global = true, default_value = "https://tacomail.de")]
    base_url: String,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = Output::Text)]
    output: Output,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Human-readable output.
    Text,
    /// Line-oriented `key=value` output for scripts.
    Plain,
    /// JSON output.
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a random email address.
    Create {
        /// Specific domain to use (otherwise random).
        #[arg(short, long)]
        domain: Option<String>,
        /// Specific username to use (otherwise random).
        #[arg(short, long)]
        username: Option<String>,
    },
    /// List all available domains.
    ListDomains,
    /// Generate an address and open a session for it in one step.
    #[command(alias = "create-with-session")]
    New {
        /// Specific domain to use (otherwise random).
        #[arg(short, long)]
        domain: Option<String>,
        /// Specific username to use (otherwise random).
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Open a session so the service accepts mail for an address.
    CreateSession {
        /// Email address (e.g. user@tacomail.de).
        email: String,
    },
    /// Close the session for an address; stored mail is kept.
    DeleteSession {
        /// Email address (e.g. user@tacomail.de).
        email: String,
    },
    /// List emails in an inbox.
    List {
        /// Email address to check.
        email: String,
        /// Maximum number of emails to show (service caps at 10).
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show a single email.
    Get {
        /// Email address.
        email: String,
        /// Email id to retrieve.
        mail_id: String,
    },
    /// Delete a single email.
    Delete {
        /// Email address.
        email: String,
        /// Email id to delete.
        mail_id: String,
    },
    /// Delete all emails in an inbox.
    Clear {
        /// Email address.
        email: String,
        /// Skip the confirmation prompt.
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// Wait for a new email to arrive.
    Wait {
        /// Email address to monitor.
        email: String,
        /// Maximum wait time in seconds.
        #[arg(short, long, default_value_t = 30)]
        timeout: u64,
        /// Check interval in seconds.
        #[arg(short, long, default_value_t = 2)]
        interval: u64,
        /// Case-insensitive regex matched against subject and sender.
        #[arg(short, long)]
        filter: Option<String>,
        /// Also print the email body.
        #[arg(short, long)]
        print_body: bool,
    },
}

const EXIT_TIMEOUT: i32 = 1;
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let client = Client::builder().base_url(&cli.base_url).build()?;

    match cli.command {
        Command::Create { domain, username } => {
            let address = make_address(&client, domain, username).await?;
            match cli.output {
                Output::Text => println!("Generated email: {address}"),
                Output::Plain => println!("email={address}"),
                Output::Json => print_json(&serde_json::json!({ "email": address }))?,
            }
        }
        Command::ListDomains => {
            let domains = client.get_domains().await?;
            match cli.output {
                Output::Text => {
                    println!("Available domains ({}):", domains.len());
                    for domain in &domains {
                        println!("  {domain}");
                    }
                }
                Output::Plain => {
                    for domain in &domains {
                        println!("{domain}");
                    }
                }
                Output::Json => print_json(&serde_json::json!({ "domains": domains }))?,
            }
        }
        Command::New { domain, username } => {
            let address = make_address(&client, domain, username).await?;
            let (user, domain) = split_address(&address)?;
            let session = client.create_session(user, domain).await?;
            print_session(cli.output, &address, &session)?;
            if cli.output == Output::Text {
                println!();
                println!("Next steps:");
                println!("  tacomail list {address}");
                println!("  tacomail wait {address}");
            }
        }
        Command::CreateSession { email } => {
            let (user, domain) = split_address(&email)?;
            let session = client.create_session(user, domain).await?;
            print_session(cli.output, &email, &session)?;
        }
        Command::DeleteSession { email } => {
            let (user, domain) = split_address(&email)?;
            client.delete_session(user, domain).await?;
            match cli.output {
                Output::Text => println!("Session deleted for {email}"),
                Output::Plain => println!("deleted={email}"),
                Output::Json => print_json(&serde_json::json!({ "deleted": email }))?,
            }
        }
        Command::List { email, limit } => {
            let inbox = client.get_inbox(&email, limit).await?;
            match cli.output {
                Output::Text => {
                    if inbox.is_empty() {
                        println!("No emails found for {email}");
                    } else {
                        for mail in &inbox {
                            println!(
                                "{}  {} <{}>  {}  {}",
                                mail.id,
                                mail.from.name,
                                mail.from.address,
                                mail.subject,
                                mail.date.format("%Y-%m-%d %H:%M"),
                            );
                        }
                        println!();
                        println!("Showing {} email(s)", inbox.len());
                    }
                }
                Output::Plain => {
                    for mail in &inbox {
                        println!(
                            "{}\t{}\t{}\t{}",
                            mail.id,
                            mail.from.address,
                            mail.subject,
                            mail.date.to_rfc3339(),
                        );
                    }
                }
                Output::Json => print_json(&inbox)?,
            }
        }
        Command::Get { email, mail_id } => {
            let mail = client.get_email(&email, &mail_id).await?;
            match cli.output {
                Output::Text => print_mail_text(&mail, true),
                Output::Plain => print_mail_plain(&mail, true),
                Output::Json => print_json(&mail)?,
            }
        }
        Command::Delete { email, mail_id } => {
            client.delete_email(&email, &mail_id).await?;
            match cli.output {
                Output::Text => println!("Email {mail_id} deleted"),
                Output::Plain => println!("deleted={mail_id}"),
                Output::Json => print_json(&serde_json::json!({ "deleted": mail_id }))?,
            }
        }
        Command::Clear { email, yes } => {
            if cli.output == Output::Text && !yes && !confirm(&format!("Delete all emails from {email}?"))? {
                anyhow::bail!("aborted");
            }
            client.delete_inbox(&email).await?;
            match cli.output {
                Output::Text => println!("Inbox cleared for {email}"),
                Output::Plain => println!("cleared={email}"),
                Output::Json => print_json(&serde_json::json!({ "cleared": email }))?,
            }
        }
        Command::Wait {
            email,
            timeout,
            interval,
            filter,
            print_body,
        } => {
            let exit = run_wait(&client, cli.output, &email, timeout, interval, filter, print_body)
                .await?;
            if exit != 0 {
                std::process::exit(exit);
            }
        }
    }

    Ok(())
}

async fn run_wait(
    client: &Client,
    output: Output,
    email: &str,
    timeout: u64,
    interval: u64,
    filter: Option<String>,
    print_body: bool,
) -> anyhow::Result<i32> {
    // Ctrl-C cancels the wait instead of killing the process mid-poll.
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let options = WaitOptions::new(
        Duration::from_secs(timeout),
        Duration::from_secs(interval.max(1)),
    )
    .with_cancel(token);

    if output == Output::Text {
        eprintln!("Waiting for email to {email}... (timeout: {timeout}s)");
    }

    let outcome = match filter {
        Some(pattern) => {
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .context("invalid --filter regex")?;
            client
                .wait_for_mail_where(
                    email,
                    move |mail: &Email| {
                        Ok(regex.is_match(&mail.subject)
                            || regex.is_match(&mail.from.address)
                            || regex.is_match(&mail.from.name))
                    },
                    &options,
                )
                .await?
        }
        None => client.wait_for_mail(email, &options).await?,
    };

    match outcome {
        WaitOutcome::Matched(mail) => {
            match output {
                Output::Text => {
                    println!("Email received!");
                    print_mail_text(&mail, print_body);
                }
                Output::Plain => print_mail_plain(&mail, print_body),
                Output::Json => print_json(&mail)?,
            }
            Ok(0)
        }
        WaitOutcome::TimedOut => {
            match output {
                Output::Text => eprintln!("Timeout: no email received"),
                Output::Plain => eprintln!("timeout"),
                Output::Json => print_json(&serde_json::json!({ "timed_out": true }))?,
            }
            Ok(EXIT_TIMEOUT)
        }
        WaitOutcome::Cancelled => {
            match output {
                Output::Text => eprintln!("Cancelled"),
                Output::Plain => eprintln!("cancelled"),
                Output::Json => print_json(&serde_json::json!({ "cancelled": true }))?,
            }
            Ok(EXIT_CANCELLED)
        }
    }
}

/// Build an address from the given parts, filling gaps from the service.
async fn make_address(
    client: &Client,
    domain: Option<String>,
    username: Option<String>,
) -> anyhow::Result<String> {
    let address = match (username, domain) {
        (Some(user), Some(domain)) => format!("{user}@{domain}"),
        (None, Some(domain)) => {
            let user = client.get_random_username().await?;
            format!("{user}@{domain}")
        }
        (Some(user), None) => {
            let domains = client.get_domains().await?;
            let domain = domains
                .first()
                .context("service reported no available domains")?;
            format!("{user}@{domain}")
        }
        (None, None) => client.get_random_address().await?,
    };
    Ok(address)
}

fn split_address(email: &str) -> anyhow::Result<(&str, &str)> {
    email
        .split_once('@')
        .filter(|(user, domain)| !user.is_empty() && !domain.is_empty())
        .with_context(|| format!("invalid email address: {email}"))
}

fn print_session(output: Output, email: &str, session: &Session) -> anyhow::Result<()> {
    let expires = session
        .expires_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| session.expires.to_string());
    match output {
        Output::Text => {
            println!("Session created");
            println!("  Email:   {email}");
            println!("  Expires: {expires}");
        }
        Output::Plain => {
            println!("email={email}");
            println!("expires={}", session.expires);
        }
        Output::Json => print_json(&serde_json::json!({
            "email": email,
            "username": session.username,
            "domain": session.domain,
            "expires": session.expires,
        }))?,
    }
    Ok(())
}

fn print_mail_text(mail: &Email, with_body: bool) {
    println!("From:    {} <{}>", mail.from.name, mail.from.address);
    println!("To:      {} <{}>", mail.to.name, mail.to.address);
    println!("Subject: {}", mail.subject);
    println!("Date:    {}", mail.date.format("%Y-%m-%d %H:%M:%S"));
    println!("ID:      {}", mail.id);
    if !mail.attachments.is_empty() {
        println!("Attachments: {} file(s)", mail.attachments.len());
        for attachment in &mail.attachments {
            let marker = if attachment.present { "+" } else { "-" };
            println!("  {marker} {} (ID: {})", attachment.file_name, attachment.id);
        }
    }
    if with_body {
        println!();
        if mail.body.text.is_empty() {
            println!("(no text body)");
        } else {
            println!("{}", mail.body.text);
        }
    }
}

fn print_mail_plain(mail: &Email, with_body: bool) {
    println!("id={}", mail.id);
    println!("from={}", mail.from.address);
    println!("to={}", mail.to.address);
    println!("subject={}", mail.subject);
    println!("date={}", mail.date.to_rfc3339());
    if with_body {
        println!("body={}", mail.body.text);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}
