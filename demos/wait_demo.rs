//! End-to-end demo: create a throwaway inbox and wait for mail to hit it.
//!
//! Run with `cargo run --example wait_demo`, then send a mail to the
//! printed address within two minutes.

use std::time::Duration;
use tacomail_client::{Client, WaitOptions, WaitOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new()?;

    let address = client.get_random_address().await?;
    let (user, domain) = address.split_once('@').expect("service returned a full address");
    let session = client.create_session(user, domain).await?;
    println!("Receiving at: {address}");
    if let Some(expires) = session.expires_at() {
        println!("Session expires: {expires}");
    }

    println!("Waiting up to 2 minutes for a mail...");
    let options = WaitOptions::new(Duration::from_secs(120), Duration::from_secs(5));
    match client.wait_for_mail(&address, &options).await? {
        WaitOutcome::Matched(mail) => {
            println!("Mail received!");
            println!("  From:    {} <{}>", mail.from.name, mail.from.address);
            println!("  Subject: {}", mail.subject);
            if !mail.body.text.is_empty() {
                println!("  Body:    {}", mail.body.text);
            }
        }
        WaitOutcome::TimedOut => println!("No mail arrived in time."),
        WaitOutcome::Cancelled => println!("Wait cancelled."),
    }

    client.delete_inbox(&address).await?;
    Ok(())
}
