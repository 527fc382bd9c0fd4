//! Plain-text rendering of accounts, listings and messages.

use std::fmt::Write as _;

use swoply_core::{account::Account, listing::Listing, message::Message};
use uuid::Uuid;

pub fn account(a: &Account) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{} <{}>", a.name, a.email);
  let _ = writeln!(out, "  id:       {}", a.account_id);
  if let Some(phone) = &a.phone {
    let _ = writeln!(out, "  phone:    {phone}");
  }
  if let Some(avatar) = &a.avatar {
    let _ = writeln!(out, "  avatar:   {avatar}");
  }
  let _ = writeln!(out, "  verified: {}", if a.verified { "yes" } else { "no" });
  let _ = writeln!(out, "  rating:   {:.1} ({} reviews)", a.rating, a.reviews_count);
  let _ = writeln!(out, "  since:    {}", a.created_at.format("%Y-%m-%d"));
  out
}

pub fn listing_table(listings: &[Listing]) -> String {
  if listings.is_empty() {
    return "No listings\n".to_owned();
  }
  let mut out = String::new();
  for l in listings {
    let _ = writeln!(
      out,
      "{}  {:<32}  {:>10} ₽  {:<16}  {}",
      l.listing_id,
      truncate(&l.title, 32),
      l.price,
      truncate(&l.location, 16),
      l.status,
    );
  }
  out
}

pub fn listing_detail(l: &Listing, seller: Option<&Account>) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", l.title);
  let _ = writeln!(out, "  {} ₽ · {} · {}", l.price, l.category.label(), l.condition);
  let _ = writeln!(out, "  {}", l.location);
  let _ = writeln!(out);
  let _ = writeln!(out, "{}", l.description);
  let _ = writeln!(out);
  if !l.tags.is_empty() {
    let _ = writeln!(out, "  tags:      {}", l.tags.join(", "));
  }
  for image in &l.images {
    let _ = writeln!(out, "  image:     {image}");
  }
  match seller {
    Some(s) => {
      let _ = writeln!(
        out,
        "  seller:    {} ({:.1}{})",
        s.name,
        s.rating,
        if s.verified { ", verified" } else { "" }
      );
    }
    None => {
      let _ = writeln!(out, "  seller:    {} (unknown account)", l.account_id);
    }
  }
  let _ = writeln!(out, "  status:    {}", l.status);
  let _ = writeln!(out, "  views:     {}", l.views);
  let _ = writeln!(out, "  favorites: {}", l.favorites.len());
  let _ = writeln!(out, "  listed:    {}", l.created_at.format("%Y-%m-%d %H:%M"));
  let _ = writeln!(out, "  id:        {}", l.listing_id);
  out
}

/// Messages from the point of view of `me`.
pub fn message_table(messages: &[Message], me: Uuid) -> String {
  if messages.is_empty() {
    return "No messages\n".to_owned();
  }
  let mut out = String::new();
  for m in messages {
    let direction = if m.sender_id == me { "→" } else { "←" };
    let other = if m.sender_id == me { m.receiver_id } else { m.sender_id };
    let unread = if !m.read && m.receiver_id == me { " *" } else { "" };
    let _ = writeln!(
      out,
      "{} {} {} [{}] {}{}",
      m.sent_at.format("%Y-%m-%d %H:%M"),
      direction,
      other,
      m.listing_id,
      m.content,
      unread,
    );
  }
  out
}

fn truncate(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_owned()
  } else {
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('…');
    t
  }
}
