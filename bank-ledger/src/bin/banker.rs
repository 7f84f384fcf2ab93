//! Interactive table-side driver for the ledger
//!
//! Reads one command per line from stdin and runs it to completion before
//! reading the next. Type `help` for the command list.

use anyhow::{anyhow, bail, Context};
use bank_ledger::{Config, Direction, Ledger, Party, PlayerId};
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  add <name>                          add a player
  players                             list players
  use <who>                           select the acting player
  send <who> <amount> [description]   pay someone as the acting player
  receive <who> <amount> [description] get paid as the acting player
  log                                 full transaction log
  history [who]                       log entries for a player
  export                              JSON snapshot of the ledger
  help                                this text
  quit                                end the session
<who> is `bank`, a roster number (1, 2, ...) or a player name.";

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Add(String),
    Players,
    Use(String),
    Transfer {
        direction: Direction,
        who: String,
        amount: Decimal,
        description: String,
    },
    Log,
    History(Option<String>),
    Export,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" => Command::Add(rest.to_string()),
            "players" | "ls" => Command::Players,
            "use" | "select" => {
                if rest.is_empty() {
                    bail!("usage: use <who>");
                }
                Command::Use(rest.to_string())
            }
            "send" | "receive" => {
                let direction = if verb.eq_ignore_ascii_case("send") {
                    Direction::Send
                } else {
                    Direction::Receive
                };
                parse_transfer(direction, rest)?
            }
            "log" => Command::Log,
            "history" => Command::History((!rest.is_empty()).then(|| rest.to_string())),
            "export" => Command::Export,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command `{}` (try `help`)", other),
        };

        Ok(command)
    }
}

fn parse_transfer(direction: Direction, rest: &str) -> anyhow::Result<Command> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let who = parts.next().filter(|s| !s.is_empty());
    let amount = parts.next();
    let (Some(who), Some(amount)) = (who, amount) else {
        bail!("usage: send|receive <who> <amount> [description]");
    };

    let amount = Decimal::from_str(amount.trim())
        .with_context(|| format!("invalid amount `{}`", amount))?;
    if amount < Decimal::ZERO {
        bail!("amount must not be negative, use send/receive for the direction");
    }

    Ok(Command::Transfer {
        direction,
        who: who.to_string(),
        amount,
        description: parts.next().unwrap_or("").trim().to_string(),
    })
}

/// Ledger plus the currently selected player
struct Session {
    ledger: Ledger,
    acting: Option<PlayerId>,
}

impl Session {
    fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            acting: None,
        }
    }

    /// Resolve `bank`, a 1-based roster number or a name
    fn resolve(&self, who: &str) -> anyhow::Result<Party> {
        let who = who.trim();
        if who.eq_ignore_ascii_case("bank") {
            return Ok(Party::Bank);
        }

        if let Ok(number) = who.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|idx| self.ledger.players().get(idx))
                .map(|player| player.party())
                .ok_or_else(|| anyhow!("no player number {}", number));
        }

        self.ledger
            .player_by_name(who)
            .map(|player| player.party())
            .ok_or_else(|| anyhow!("no player named `{}`", who))
    }

    fn resolve_player(&self, who: &str) -> anyhow::Result<PlayerId> {
        match self.resolve(who)? {
            Party::Player(id) => Ok(id),
            Party::Bank => bail!("the bank is not a player"),
        }
    }

    /// Run one command; returns `false` when the session should end
    fn execute(&mut self, command: Command, out: &mut String) -> anyhow::Result<bool> {
        match command {
            Command::Add(name) => {
                if let Some(player) = self.ledger.add_player(&name) {
                    out.push_str(&format!(
                        "{} joins with {} ({})\n",
                        player.name, player.balance, player.color
                    ));
                    // First player becomes the acting one
                    if self.acting.is_none() {
                        self.acting = Some(player.id.clone());
                    }
                }
            }
            Command::Players => {
                for (i, player) in self.ledger.players().iter().enumerate() {
                    let marker = if self.acting.as_ref() == Some(&player.id) {
                        '*'
                    } else {
                        ' '
                    };
                    out.push_str(&format!(
                        "{}{:>2}. {:<16} {:>10}  {}\n",
                        marker,
                        i + 1,
                        player.name,
                        player.balance,
                        player.color
                    ));
                }
            }
            Command::Use(who) => {
                let id = self.resolve_player(&who)?;
                let party = Party::Player(id.clone());
                out.push_str(&format!("Acting as {}\n", self.ledger.party_name(&party)));
                self.acting = Some(id);
            }
            Command::Transfer {
                direction,
                who,
                amount,
                description,
            } => {
                let acting = self
                    .acting
                    .clone()
                    .ok_or_else(|| anyhow!("select a player first with `use <who>`"))?;
                let counterparty = self.resolve(&who)?;
                let tx = self
                    .ledger
                    .request_directed_transfer(
                        &acting,
                        &counterparty,
                        direction,
                        amount,
                        &description,
                    )?
                    .clone();
                out.push_str(&format!("{}\n", self.ledger.receipt(&acting, &tx)));
            }
            Command::Log => {
                for tx in self.ledger.transactions() {
                    out.push_str(&format!(
                        "{} {} -> {}  {}  ({})\n",
                        tx.id,
                        self.ledger.party_name(&tx.from),
                        self.ledger.party_name(&tx.to),
                        tx.amount,
                        tx.description
                    ));
                }
            }
            Command::History(who) => {
                let id = match who {
                    Some(who) => self.resolve_player(&who)?,
                    None => self
                        .acting
                        .clone()
                        .ok_or_else(|| anyhow!("select a player first with `use <who>`"))?,
                };
                let mut empty = true;
                for row in self.ledger.history_for(&id) {
                    out.push_str(&format!("{}\n", row));
                    empty = false;
                }
                if empty {
                    out.push_str("No transactions yet\n");
                }
            }
            Command::Export => {
                let json = serde_json::to_string_pretty(&self.ledger.snapshot())?;
                out.push_str(&json);
                out.push('\n');
            }
            Command::Help => {
                out.push_str(HELP);
                out.push('\n');
            }
            Command::Quit => return Ok(false),
        }

        Ok(true)
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = match std::env::var("BANK_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {}", path))?
            .with_env_overrides()?,
        Err(_) => Config::from_env()?,
    };
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting session"
    );

    let mut session = Session::new(Ledger::new(config)?);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type `help` for commands.");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let mut out = String::new();
        let keep_going = line
            .parse::<Command>()
            .and_then(|command| session.execute(command, &mut out));

        match keep_going {
            Ok(true) => print!("{}", out),
            Ok(false) => break,
            Err(e) => println!("Error: {}", e),
        }
    }

    session.ledger.verify_consistency()?;
    tracing::info!(
        players = session.ledger.player_count(),
        transactions = session.ledger.transaction_count(),
        "Session ended"
    );
    Ok(())
}
