use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::IntoEnumIterator;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::cache_dir;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::markup;
use crate::domain::services::LocalStore;
use crate::domain::services::StoreKey;

const HOTKEYS: &str = "HOTKEYS:
- Enter: Scrape the URL, or send the message, of the focused input.
- Tab: Switch focus between the URL and message inputs.
- Up/Down, PageUp/PageDown, CTRL+U/CTRL+D: Scroll the conversation.
- CTRL+C: Quit.";

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn open_store() -> Result<LocalStore> {
    return LocalStore::open(path::Path::new(&Config::get(ConfigKey::StoreFile))).await;
}

async fn print_store() -> Result<()> {
    let store = open_store().await?;
    let lines = StoreKey::iter()
        .map(|key| {
            let val = store.get(key).unwrap_or_else(|| return "(unset)".to_string());
            return format!("{key}: {val}");
        })
        .collect::<Vec<String>>();

    println!("{}", lines.join("\n"));
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_store() -> Command {
    return Command::new("store")
        .about("Inspect the locally stored session.")
        .subcommand(Command::new("show").about("Print the stored session ID and URL."))
        .subcommand(Command::new("clear").about("Forget the stored session ID and URL."))
        .subcommand(Command::new("path").about("Print the path of the local store file."));
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for scrapechat")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running scrapechat with environment variable RUST_LOG=scrapechat")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        )
        .subcommand(
            Command::new("format-message")
                .about("Print the HTML a chat message is formatted into.")
                .arg(
                    clap::Arg::new("text")
                        .short('t')
                        .long("text")
                        .help("Message text to format")
                        .required(true),
                ),
        );
}

pub fn build() -> Command {
    let hotkeys_text = HOTKEYS
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            return Paint::new(line).underline().bold().to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("scrapechat")
        .about(about)
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(hotkeys_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(subcommand_store())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("SCRAPECHAT_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::ServerURL.to_string())
                .long(ConfigKey::ServerURL.to_string())
                .env("SCRAPECHAT_SERVER_URL")
                .num_args(1)
                .help(format!("Base URL of the scrape and chat server. [default: {}]", Config::default(ConfigKey::ServerURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StoreFile.to_string())
                .long(ConfigKey::StoreFile.to_string())
                .env("SCRAPECHAT_STORE_FILE")
                .num_args(1)
                .help(format!("Where the current session ID and URL are kept between runs. [default: {}]", Config::default(ConfigKey::StoreFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::NotificationTimeout.to_string())
                .long(ConfigKey::NotificationTimeout.to_string())
                .env("SCRAPECHAT_NOTIFICATION_TIMEOUT")
                .num_args(1)
                .help(format!("Time in milliseconds a notification stays on screen. [default: {}]", Config::default(ConfigKey::NotificationTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .long(ConfigKey::Username.to_string())
                .env("SCRAPECHAT_USERNAME")
                .num_args(1)
                .help("Your user name displayed in all chat bubbles. [default: $USER]")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Url.to_string())
                .short('u')
                .long(ConfigKey::Url.to_string())
                .num_args(1)
                .help("Website to scrape as soon as the UI starts."),
        );
}

async fn parse_store(matches: &ArgMatches, store_matches: &ArgMatches) -> Result<()> {
    Config::load(build(), vec![matches, store_matches]).await?;

    match store_matches.subcommand() {
        Some(("show", _)) => {
            print_store().await?;
        }
        Some(("clear", _)) => {
            let mut store = open_store().await?;
            store.clear();
            store.flush().await?;
            if let Some(store_path) = store.path() {
                println!("Cleared local store at {}", store_path.to_string_lossy());
            }
        }
        Some(("path", _)) => {
            println!("{}", Config::get(ConfigKey::StoreFile));
        }
        _ => {
            subcommand_store().print_long_help()?;
        }
    }

    return Ok(());
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = cache_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                Some(("format-message", fm_matches)) => {
                    if let Some(text) = fm_matches.get_one::<String>("text") {
                        println!("{}", markup::format_message_text(text));
                    }
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("store", subcmd_matches)) => {
            parse_store(&matches, subcmd_matches).await?;
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
