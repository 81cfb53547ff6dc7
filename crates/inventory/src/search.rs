//! Item search: which shelves hold what the user typed.

use shelfwise_core::ShelfId;

use crate::item::Item;

fn push_unique(out: &mut Vec<ShelfId>, id: ShelfId) {
    if !out.contains(&id) {
        out.push(id);
    }
}

/// Items selected by `query` (case-insensitive). Substring mode matches name or
/// SKU. Exact mode keeps items named exactly `query` and falls back to substring
/// matching when there are none. A blank query matches nothing.
pub fn matching_items<'a>(items: &'a [Item], query: &str, exact: bool) -> Vec<&'a Item> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    if exact {
        let named: Vec<&Item> = items.iter().filter(|i| i.name.to_lowercase() == needle).collect();
        if !named.is_empty() {
            return named;
        }
    }
    items
        .iter()
        .filter(|i| i.name.to_lowercase().contains(&needle) || i.sku.to_lowercase().contains(&needle))
        .collect()
}

/// Distinct shelves of `items`, in first-seen order.
pub fn shelves_holding<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<ShelfId> {
    let mut out = Vec::new();
    for item in items {
        push_unique(&mut out, item.shelf_id);
    }
    out
}

/// Distinct item names containing `query`; prefix matches first, then alphabetical.
pub fn suggestions(items: &[Item], query: &str, limit: usize) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut names: Vec<&str> = items
        .iter()
        .map(|i| i.name.as_str())
        .filter(|n| n.to_lowercase().contains(&needle))
        .collect();
    names.sort_by_key(|n| {
        let lower = n.to_lowercase();
        (!lower.starts_with(&needle), lower)
    });
    names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    names.into_iter().take(limit).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shelfwise_core::ItemId;

    fn item(shelf_id: ShelfId, name: &str, sku: &str) -> Item {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Item {
            id: ItemId::new(),
            shelf_id,
            name: name.to_string(),
            sku: sku.to_string(),
            description: None,
            quantity: 1,
            price: 0.0,
            category: "General".to_string(),
            created_at: t,
            updated_at: t,
        }
    }

    fn shelves_for(items: &[Item], query: &str, exact: bool) -> Vec<ShelfId> {
        shelves_holding(matching_items(items, query, exact))
    }

    fn fixture() -> (ShelfId, ShelfId, Vec<Item>) {
        let a = ShelfId::new();
        let b = ShelfId::new();
        let items = vec![
            item(a, "Bolts", "SKU-001"),
            item(a, "Nuts", "SKU-002"),
            item(b, "Wing Nuts", "SKU-003"),
            item(b, "Bolt Cutter", "TOOL-9"),
        ];
        (a, b, items)
    }

    #[test]
    fn substring_search_is_case_insensitive_and_distinct() {
        let (a, b, items) = fixture();
        assert_eq!(shelves_for(&items, "NUTS", false), vec![a, b]);
        assert_eq!(shelves_for(&items, "bolt", false), vec![a, b]);
        assert_eq!(shelves_for(&items, "tool", false), vec![b]);
    }

    #[test]
    fn blank_query_finds_nothing() {
        let (_, _, items) = fixture();
        assert!(shelves_for(&items, "   ", false).is_empty());
        assert!(suggestions(&items, "", 5).is_empty());
    }

    #[test]
    fn exact_match_wins_over_substring() {
        let (a, b, items) = fixture();
        assert_eq!(shelves_for(&items, "nuts", true), vec![a]);
        assert_eq!(shelves_for(&items, "cutter", true), vec![b]);
    }

    #[test]
    fn exact_items_agree_with_exact_shelves() {
        let (a, _, items) = fixture();
        let named: Vec<&str> = matching_items(&items, "Nuts", true).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(named, vec!["Nuts"]);
        assert_eq!(shelves_for(&items, "Nuts", true), vec![a]);

        let loose: Vec<&str> = matching_items(&items, "Nuts", false).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(loose, vec!["Nuts", "Wing Nuts"]);
    }

    #[test]
    fn suggestions_rank_prefix_matches_first() {
        let (_, _, items) = fixture();
        assert_eq!(suggestions(&items, "nu", 10), vec!["Nuts", "Wing Nuts"]);
        assert_eq!(suggestions(&items, "bolt", 1), vec!["Bolt Cutter"]);
    }
}
