//! `cmdpal list`: print the grouped projection for a query

use anyhow::Result;
use clap::Parser;
use cmdpal_core::{Action, EmptyState, Item, PaletteConfig, SelectableList};
use serde::Serialize;

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Filter query (case-insensitive substring of title, description or keywords)
    #[arg(long, short = 'q', default_value = "")]
    pub query: String,

    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ListedItem<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

impl<'a> From<&'a Item> for ListedItem<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            id: &item.id,
            title: &item.title,
            description: item.description.as_deref(),
            category: item.category.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ListedGroup<'a> {
    label: String,
    items: Vec<ListedItem<'a>>,
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    query: &'a str,
    total: usize,
    matched: usize,
    groups: Vec<ListedGroup<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    empty: Option<EmptyState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

pub fn run_list(args: ListArgs, config: &PaletteConfig) -> Result<()> {
    let items = config.build_items(|_| Action::noop());
    let mut list = SelectableList::new(items, config.categories.clone());
    list.set_query(args.query.as_str());

    let empty = list.empty_state();
    let listing = Listing {
        query: &args.query,
        total: list.items().len(),
        matched: list.len(),
        groups: list
            .grouped_items()
            .into_iter()
            .map(|(label, items)| ListedGroup {
                label,
                items: items.into_iter().map(ListedItem::from).collect(),
            })
            .collect(),
        empty,
        message: empty.map(|state| config.empty_message(state)),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if let Some(message) = listing.message {
        println!("{}", message);
        return Ok(());
    }

    for group in &listing.groups {
        println!("{}", group.label);
        for item in &group.items {
            match item.description {
                Some(description) => println!("  {:<24} {}  ({})", item.id, item.title, description),
                None => println!("  {:<24} {}", item.id, item.title),
            }
        }
    }
    Ok(())
}
