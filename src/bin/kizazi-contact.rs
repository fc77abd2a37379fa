//! Submit a consultation request to Kizazi Technologies from the command line.
//!
//! # Usage
//!
//! ```bash
//! kizazi-contact --first-name Amara --last-name Banda \
//!     --email amara@example.com --service "AI & Automation" \
//!     --message "We would like to automate our invoicing."
//! ```

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use kizazi::{ContactRelay, ContactRequest, ServiceInterest};

/// Command-line arguments for the kizazi-contact tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct Args {
    #[arrrg(optional, "First name", "NAME")]
    first_name: Option<String>,

    #[arrrg(optional, "Last name", "NAME")]
    last_name: Option<String>,

    #[arrrg(optional, "Reply-to email address", "EMAIL")]
    email: Option<String>,

    /// One of the service labels shown on the form.
    #[arrrg(optional, "Service of interest (default: General Inquiry)", "SERVICE")]
    service: Option<String>,

    #[arrrg(optional, "Message body", "TEXT")]
    message: Option<String>,

    /// Relay endpoint override, for testing against a local server.
    #[arrrg(optional, "Form relay URL", "URL")]
    endpoint: Option<String>,

    #[arrrg(optional, "Request timeout in seconds (default: 30)", "SECONDS")]
    timeout: Option<u64>,

    /// Validate and print the form without sending it.
    #[arrrg(flag, "Validate and print the form, do not send")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (args, free) = Args::from_command_line_relaxed("kizazi-contact [OPTIONS]");
    if !free.is_empty() {
        eprintln!("Error: unexpected arguments: {}", free.join(" "));
        std::process::exit(1);
    }

    let service = match args.service.as_deref() {
        Some(service) => service.parse()?,
        None => ServiceInterest::default(),
    };
    let request = ContactRequest {
        first_name: args.first_name.unwrap_or_default(),
        last_name: args.last_name.unwrap_or_default(),
        email: args.email.unwrap_or_default(),
        service,
        message: args.message.unwrap_or_default(),
    };

    if args.dry_run {
        request.validate()?;
        for (name, value) in request.form_fields() {
            println!("{name}: {value}");
        }
        return Ok(());
    }

    let relay = ContactRelay::with_options(
        args.endpoint.as_deref(),
        args.timeout.map(std::time::Duration::from_secs),
    )?;
    relay.submit(&request).await?;
    println!("Consultation request sent to {}", relay.endpoint());
    Ok(())
}
