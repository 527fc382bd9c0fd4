//! Subcommands and their handlers.
//!
//! Every handler dispatches one user intent into the session service or the
//! store, then re-queries the store to show the resulting state.

use anyhow::{Context as _, anyhow, bail};
use clap::Subcommand;
use strum::IntoEnumIterator;
use swoply_auth::{AuthService, ProfileUpdate};
use swoply_core::{
  form::{ListingForm, RegistrationForm},
  listing::{Category, ListingPatch, ListingQuery, ListingStatus},
  message::{Message, NewMessage},
  store::MarketStore,
};
use uuid::Uuid;

use crate::render;

// ─── Command tree ─────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create an account and log in.
  Register {
    #[arg(long)]
    email:    String,
    #[arg(long)]
    name:     String,
    #[arg(long)]
    phone:    Option<String>,
    /// Read from stdin when omitted.
    #[arg(long)]
    password: Option<String>,
  },
  /// Log in to an existing account.
  Login {
    #[arg(long)]
    email:    String,
    /// Read from stdin when omitted.
    #[arg(long)]
    password: Option<String>,
  },
  /// Log out and forget the saved session.
  Logout,
  /// Show the logged-in account.
  Whoami,
  /// Update the logged-in account's profile.
  Profile {
    #[arg(long)]
    name:        Option<String>,
    #[arg(long, conflicts_with = "clear_phone")]
    phone:       Option<String>,
    #[arg(long)]
    clear_phone: bool,
    #[arg(long)]
    avatar:      Option<String>,
  },
  /// List catalogue categories.
  Categories,
  #[command(subcommand)]
  Listing(ListingCommand),
  /// Add or remove a listing from your favorites.
  Favorite { id: Uuid },
  #[command(subcommand)]
  Message(MessageCommand),
}

#[derive(Subcommand, Debug)]
pub enum ListingCommand {
  /// Publish a new listing.
  Create {
    #[arg(long)]
    title:       String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price:       String,
    #[arg(long)]
    category:    String,
    #[arg(long)]
    condition:   String,
    #[arg(long)]
    location:    String,
    /// Comma-separated.
    #[arg(long, default_value = "")]
    tags:        String,
    #[arg(long, default_value = "")]
    image:       String,
  },
  /// Show one listing and count the view.
  Show { id: Uuid },
  /// Search active listings, newest first.
  Search {
    query:     Option<String>,
    #[arg(long)]
    category:  Option<Category>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    location:  Option<String>,
  },
  /// Your own listings, whatever their status.
  Mine,
  /// Active listings in one category.
  Category { category: Category },
  /// Change the status of one of your listings.
  Status { id: Uuid, status: ListingStatus },
  /// Delete one of your listings.
  Delete { id: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum MessageCommand {
  /// Message the seller (or, with `--to`, a buyer) about a listing.
  Send {
    listing: Uuid,
    content: String,
    #[arg(long)]
    to:      Option<Uuid>,
  },
  /// Your conversations, or the thread of one listing.
  List {
    #[arg(long)]
    listing: Option<Uuid>,
  },
  /// Mark a message as read.
  Read { id: Uuid },
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub async fn run<S: MarketStore>(
  auth: &mut AuthService<S>,
  command: Command,
) -> anyhow::Result<()> {
  match command {
    Command::Register { email, name, phone, password } => {
      let password = password_or_stdin(password)?;
      let form = RegistrationForm { email, password, name, phone };
      let account = auth.register(&form).await?;
      println!("Registered and logged in as {} <{}>", account.name, account.email);
    }

    Command::Login { email, password } => {
      let password = password_or_stdin(password)?;
      let account = auth.login(&email, &password).await?;
      println!("Logged in as {} <{}>", account.name, account.email);
    }

    Command::Logout => {
      auth.logout().await?;
      println!("Logged out");
    }

    Command::Whoami => match auth.current() {
      Some(account) => print!("{}", render::account(account)),
      None => println!("Not logged in"),
    },

    Command::Profile { name, phone, clear_phone, avatar } => {
      let update = ProfileUpdate {
        name,
        phone: if clear_phone { Some(None) } else { phone.map(Some) },
        avatar: avatar.map(Some),
      };
      let account = auth.update_profile(update).await?;
      print!("{}", render::account(&account));
    }

    Command::Categories => {
      for category in Category::iter() {
        println!("{:<12} {}", category.as_ref(), category.label());
      }
    }

    Command::Listing(cmd) => run_listing(auth, cmd).await?,

    Command::Favorite { id } => {
      let account_id = auth.require_current()?.account_id;
      let added = auth
        .store()
        .toggle_favorite(id, account_id)
        .await?
        .ok_or_else(|| anyhow!("listing {id} not found"))?;
      println!("{}", if added { "Added to favorites" } else { "Removed from favorites" });
    }

    Command::Message(cmd) => run_message(auth, cmd).await?,
  }
  Ok(())
}

async fn run_listing<S: MarketStore>(
  auth: &AuthService<S>,
  command: ListingCommand,
) -> anyhow::Result<()> {
  let store = auth.store();

  match command {
    ListingCommand::Create {
      title,
      description,
      price,
      category,
      condition,
      location,
      tags,
      image,
    } => {
      let account_id = auth.require_current()?.account_id;
      let form = ListingForm {
        title,
        description,
        price,
        category,
        condition,
        location,
        tags,
        image_url: image,
      };
      let input = form.validate(account_id)?;
      let listing = store.create_listing(input).await?;
      println!("Listing created: {}", listing.listing_id);
    }

    ListingCommand::Show { id } => {
      let listing = store
        .increment_views(id)
        .await?
        .ok_or_else(|| anyhow!("listing {id} not found"))?;
      let seller = store.get_account(listing.account_id).await?;
      print!("{}", render::listing_detail(&listing, seller.as_ref()));
    }

    ListingCommand::Search { query, category, min_price, max_price, location } => {
      let query = ListingQuery { text: query, category, min_price, max_price, location };
      let listings = store.search_listings(&query).await?;
      print!("{}", render::listing_table(&listings));
    }

    ListingCommand::Mine => {
      let account_id = auth.require_current()?.account_id;
      let listings = store.listings_by_account(account_id).await?;
      print!("{}", render::listing_table(&listings));
    }

    ListingCommand::Category { category } => {
      let listings = store.listings_by_category(category).await?;
      print!("{}", render::listing_table(&listings));
    }

    ListingCommand::Status { id, status } => {
      let account_id = auth.require_current()?.account_id;
      ensure_owner(store, id, account_id).await?;
      let listing = store
        .update_listing(id, ListingPatch::status(status))
        .await?
        .ok_or_else(|| anyhow!("listing {id} not found"))?;
      println!("Listing {} is now {}", listing.listing_id, listing.status);
    }

    ListingCommand::Delete { id } => {
      let account_id = auth.require_current()?.account_id;
      ensure_owner(store, id, account_id).await?;
      if store.delete_listing(id).await? {
        println!("Listing {id} deleted");
      } else {
        bail!("listing {id} not found");
      }
    }
  }
  Ok(())
}

async fn run_message<S: MarketStore>(
  auth: &AuthService<S>,
  command: MessageCommand,
) -> anyhow::Result<()> {
  let account_id = auth.require_current()?.account_id;
  let store = auth.store();

  match command {
    MessageCommand::Send { listing, content, to } => {
      let message = send_message(store, account_id, listing, to, &content).await?;
      println!("Message sent: {}", message.message_id);
    }

    MessageCommand::List { listing } => {
      let messages = match listing {
        Some(listing_id) => thread(store, account_id, listing_id).await?,
        None => store.conversations(account_id).await?,
      };
      print!("{}", render::message_table(&messages, account_id));
    }

    MessageCommand::Read { id } => {
      let message = mark_read(store, account_id, id).await?;
      println!("Message {} marked as read", message.message_id);
    }
  }
  Ok(())
}

/// Send `content` about `listing_id`. Without `to`, the message goes to the
/// listing's owner.
pub(crate) async fn send_message<S: MarketStore>(
  store: &S,
  account_id: Uuid,
  listing_id: Uuid,
  to: Option<Uuid>,
  content: &str,
) -> anyhow::Result<Message> {
  let listing = store
    .get_listing(listing_id)
    .await?
    .ok_or_else(|| anyhow!("listing {listing_id} not found"))?;

  let receiver = match to {
    Some(to) => {
      if store.get_account(to).await?.is_none() {
        bail!("account {to} not found");
      }
      to
    }
    None if listing.account_id != account_id => listing.account_id,
    None => bail!("this is your own listing; pass --to <account> to reply to a buyer"),
  };
  if receiver == account_id {
    bail!("cannot send a message to yourself");
  }

  let content = content.trim();
  if content.is_empty() {
    bail!("message is empty");
  }

  let message = store
    .create_message(NewMessage::new(listing.listing_id, account_id, receiver, content))
    .await?;
  Ok(message)
}

/// The part of a listing's thread that `account_id` sent or received.
pub(crate) async fn thread<S: MarketStore>(
  store: &S,
  account_id: Uuid,
  listing_id: Uuid,
) -> anyhow::Result<Vec<Message>> {
  let mut messages = store.messages_for_listing(listing_id).await?;
  messages.retain(|m| m.involves(account_id));
  Ok(messages)
}

/// Mark a message as read. Only its receiver may do so.
pub(crate) async fn mark_read<S: MarketStore>(
  store: &S,
  account_id: Uuid,
  message_id: Uuid,
) -> anyhow::Result<Message> {
  let message = store
    .list_messages()
    .await?
    .into_iter()
    .find(|m| m.message_id == message_id)
    .ok_or_else(|| anyhow!("message {message_id} not found"))?;
  if message.receiver_id != account_id {
    bail!("message {message_id} was not sent to you");
  }

  store
    .mark_message_read(message_id)
    .await?
    .ok_or_else(|| anyhow!("message {message_id} not found"))
}

async fn ensure_owner<S: MarketStore>(
  store: &S,
  listing_id: Uuid,
  account_id: Uuid,
) -> anyhow::Result<()> {
  let listing = store
    .get_listing(listing_id)
    .await?
    .ok_or_else(|| anyhow!("listing {listing_id} not found"))?;
  if listing.account_id != account_id {
    bail!("listing {listing_id} belongs to another account");
  }
  Ok(())
}

/// Use the flag value, or read a password from stdin.
fn password_or_stdin(password: Option<String>) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};

  if let Some(password) = password {
    return Ok(password);
  }

  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read password")?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
