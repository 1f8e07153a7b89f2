use cmdpal_core::{filter, Item, Key, KeyPress, Outcome, OverlayController};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Small alphabet so queries actually hit
fn arb_text() -> impl Strategy<Value = String> {
    "[a-cA-C ]{0,8}"
}

fn arb_item() -> impl Strategy<Value = (String, Option<String>, Vec<String>)> {
    (
        arb_text(),
        prop::option::of(arb_text()),
        prop::collection::vec("[a-c]{1,4}", 0..3),
    )
}

fn build_items(specs: &[(String, Option<String>, Vec<String>)]) -> Vec<Item> {
    specs
        .iter()
        .enumerate()
        .map(|(idx, (title, description, keywords))| {
            let mut item = Item::new(format!("item-{}", idx), title.clone())
                .with_keywords(keywords.iter().cloned());
            item.description = description.clone();
            item
        })
        .collect()
}

fn oracle(item: &Item, query: &str) -> bool {
    let q = query.to_lowercase();
    item.title.to_lowercase().contains(&q)
        || item
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(&q))
        || item.keywords.iter().any(|k| k.to_lowercase().contains(&q))
}

#[derive(Debug, Clone)]
enum Input {
    Down,
    Up,
    Type(char),
    Backspace,
}

fn arb_input() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::Down),
        Just(Input::Up),
        prop::sample::select(vec!['a', 'b', 'c', 'A', ' ']).prop_map(Input::Type),
        Just(Input::Backspace),
    ]
}

proptest! {
    /// Property: an item is in the projection iff it passes the substring test
    #[test]
    fn prop_filter_matches_oracle(
        specs in prop::collection::vec(arb_item(), 0..20),
        query in "[a-cA-C]{0,3}",
    ) {
        let items = build_items(&specs);
        let projection = filter(&items, &query);

        for (idx, item) in items.iter().enumerate() {
            prop_assert_eq!(projection.contains(&idx), oracle(item, &query));
        }
    }

    /// Property: the projection is a subsequence of the source
    #[test]
    fn prop_filter_preserves_order(
        specs in prop::collection::vec(arb_item(), 0..20),
        query in "[a-cA-C]{0,3}",
    ) {
        let items = build_items(&specs);
        let projection = filter(&items, &query);

        prop_assert!(projection.windows(2).all(|w| w[0] < w[1]));
    }

    /// Property: the cursor stays inside the projection, and any query
    /// change puts it back at the top
    #[test]
    fn prop_cursor_bounds_and_reset(
        specs in prop::collection::vec(arb_item(), 0..12),
        inputs in prop::collection::vec(arb_input(), 0..40),
    ) {
        let mut palette = OverlayController::new(build_items(&specs), vec![]);
        palette.open();

        for input in inputs {
            let before = palette.query().to_string();
            match input {
                Input::Down => { palette.handle_key(Key::Down.into()); }
                Input::Up => { palette.handle_key(Key::Up.into()); }
                Input::Type(c) => { palette.handle_key(KeyPress::plain(Key::Char(c))); }
                Input::Backspace => { palette.handle_key(Key::Backspace.into()); }
            }

            let len = palette.list().len();
            if len == 0 {
                prop_assert_eq!(palette.cursor(), 0);
            } else {
                prop_assert!(palette.cursor() < len);
            }
            if palette.query() != before {
                prop_assert_eq!(palette.cursor(), 0);
            }
        }
    }

    /// Property: one Enter runs at most one action, and nothing runs after close
    #[test]
    fn prop_single_dispatch(
        count in 1usize..8,
        downs in 0usize..10,
        enters in 1usize..4,
    ) {
        let hits = Arc::new(AtomicUsize::new(0));
        let items: Vec<Item> = (0..count)
            .map(|idx| {
                let hits = Arc::clone(&hits);
                Item::new(format!("item-{}", idx), format!("Item {}", idx))
                    .with_action(move || { hits.fetch_add(1, Ordering::SeqCst); })
            })
            .collect();

        let mut palette = OverlayController::new(items, vec![]);
        palette.open();
        for _ in 0..downs {
            palette.handle_key(Key::Down.into());
        }

        let expected = format!("item-{}", downs.min(count - 1));
        let first = palette.handle_key(Key::Enter.into());
        prop_assert_eq!(first, Outcome::Dispatched { id: expected });
        for _ in 1..enters {
            prop_assert_eq!(palette.handle_key(Key::Enter.into()), Outcome::Ignored);
        }
        prop_assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
