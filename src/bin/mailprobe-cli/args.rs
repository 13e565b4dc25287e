use anyhow::{Result, bail};
use clap::Parser;
use mailprobe::VerifyOptions;

#[derive(Parser, Debug)]
#[command(name = "mailprobe-cli", version)]
#[command(about = "Checks whether e-mail addresses are deliverable without sending mail")]
pub struct Cli {
    /// comma-separated list of addresses
    #[arg(short = 'l', long = "list", required = true, value_delimiter = ',')]
    pub list: Vec<String>,

    /// SMTP port (1-65535)
    #[arg(short, long, default_value_t = 25, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// MAIL FROM address (default name@example.org)
    #[arg(short, long)]
    pub sender: Option<String>,

    /// budget for each SMTP probe in ms, 0 or less disables it
    #[arg(short, long, default_value_t = 5_000, allow_negative_numbers = true)]
    pub timeout: i64,

    /// name announced in EHLO (default mail.example.org)
    #[arg(long)]
    pub fqdn: Option<String>,

    /// DNS server to query instead of the system ones (repeatable, ip or ip:port)
    #[arg(long, value_delimiter = ',')]
    pub dns: Vec<String>,

    /// reply substring treated as acceptance, e.g. 450 for greylisting
    #[arg(long)]
    pub ignore: Option<String>,

    /// debug logs on stderr
    #[arg(short, long)]
    pub debug: bool,

    /// format: human|json
    #[arg(long, default_value = "human")]
    pub format: String,
}

impl Cli {
    /// Entries of `--list` that look like addresses.
    pub fn addresses(&self) -> Result<Vec<String>> {
        let list: Vec<String> = self
            .list
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty() && entry.contains('@'))
            .map(str::to_string)
            .collect();
        if list.is_empty() {
            bail!("I haven't recognized any email!");
        }
        Ok(list)
    }

    pub fn options(&self) -> VerifyOptions {
        let defaults = VerifyOptions::default();
        VerifyOptions {
            port: self.port,
            sender: self.sender.clone().unwrap_or(defaults.sender),
            timeout_ms: self.timeout,
            fqdn: self.fqdn.clone().unwrap_or(defaults.fqdn),
            dns: self.dns.clone(),
            ignore: self.ignore.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mailprobe-cli").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn list_is_split_and_filtered() {
        let cli = parse(&["--list", "a@example.com, ,nope,b@example.org"]);
        assert_eq!(
            cli.addresses().unwrap(),
            vec!["a@example.com", "b@example.org"]
        );
    }

    #[test]
    fn list_without_addresses_is_an_error() {
        let cli = parse(&["-l", "foo,bar"]);
        assert!(cli.addresses().is_err());
    }

    #[test]
    fn port_must_be_in_range() {
        let args = ["mailprobe-cli", "-l", "a@example.com", "-p", "0"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["mailprobe-cli", "-l", "a@example.com", "-p", "65536"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn flags_map_onto_options() {
        let cli = parse(&[
            "-l",
            "a@example.com",
            "-p",
            "2525",
            "-t",
            "-1",
            "--dns",
            "1.1.1.1,9.9.9.9",
            "--ignore",
            "450",
        ]);
        let options = cli.options();
        assert_eq!(options.port, 2525);
        assert_eq!(options.timeout(), None);
        assert_eq!(options.dns, vec!["1.1.1.1", "9.9.9.9"]);
        assert_eq!(options.ignore(), Some("450"));
        assert_eq!(options.sender, "name@example.org");
        assert_eq!(options.fqdn, "mail.example.org");
    }
}
