// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone hierarchy rendering.

use std::collections::{BTreeMap, HashSet};

use crate::types::Zone;

/// Renders zones as an indented tree.
///
/// Roots are zones without a parent. Siblings are sorted by name
/// (case-insensitive, then exact), and each zone becomes a line
/// `"<indent>- <name> (<id>)"` with two spaces per level.
///
/// Zones whose parent is not in the list are not shown. A zone is expanded
/// at most once, so duplicate ids and parent cycles terminate.
///
/// # Examples
///
/// ```
/// use homey_cli::types::Zone;
/// use homey_cli::zones::render_zone_tree;
///
/// let zones = [
///     Zone::new("1", "B", None),
///     Zone::new("2", "A", None),
///     Zone::new("3", "C", Some("1")),
/// ];
/// assert_eq!(render_zone_tree(&zones), "- A (2)\n- B (1)\n  - C (3)");
/// ```
#[must_use]
pub fn render_zone_tree(zones: &[Zone]) -> String {
    let mut children: BTreeMap<Option<&str>, Vec<&Zone>> = BTreeMap::new();
    for zone in zones {
        let parent = zone.parent.as_deref().filter(|parent| !parent.is_empty());
        children.entry(parent).or_default().push(zone);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    let mut lines = Vec::with_capacity(zones.len());
    let mut expanded = HashSet::new();
    // (parent, depth) frames, children pushed in reverse to keep sibling order.
    let mut stack: Vec<(&Zone, usize)> = children
        .get(&None)
        .map(|roots| roots.iter().rev().map(|zone| (*zone, 0)).collect())
        .unwrap_or_default();

    while let Some((zone, depth)) = stack.pop() {
        lines.push(format!("{}- {} ({})", "  ".repeat(depth), zone.name, zone.id));
        if !expanded.insert(zone.id.as_str()) {
            tracing::warn!(zone = %zone.id, "zone listed twice or part of a cycle, not expanded again");
            continue;
        }
        if let Some(kids) = children.get(&Some(zone.id.as_str())) {
            stack.extend(kids.iter().rev().map(|kid| (*kid, depth + 1)));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_sorted_and_children_indented() {
        let zones = vec![
            Zone::new("1", "B", None),
            Zone::new("2", "A", None),
            Zone::new("3", "C", Some("1")),
        ];
        assert_eq!(render_zone_tree(&zones), "- A (2)\n- B (1)\n  - C (3)");
    }

    #[test]
    fn deep_nesting() {
        let zones = vec![
            Zone::new("home", "Home", None),
            Zone::new("ground", "Ground floor", Some("home")),
            Zone::new("kitchen", "Kitchen", Some("ground")),
            Zone::new("attic", "Attic", Some("home")),
        ];
        assert_eq!(
            render_zone_tree(&zones),
            "- Home (home)\n  - Attic (attic)\n  - Ground floor (ground)\n    - Kitchen (kitchen)"
        );
    }

    #[test]
    fn sorting_ignores_case() {
        let zones = vec![
            Zone::new("1", "bedroom", None),
            Zone::new("2", "Attic", None),
            Zone::new("3", "Cellar", None),
        ];
        assert_eq!(
            render_zone_tree(&zones),
            "- Attic (2)\n- bedroom (1)\n- Cellar (3)"
        );
    }

    #[test]
    fn empty_parent_counts_as_root() {
        let zones = vec![Zone::new("1", "Home", Some(""))];
        assert_eq!(render_zone_tree(&zones), "- Home (1)");
    }

    #[test]
    fn orphans_are_not_shown() {
        let zones = vec![
            Zone::new("1", "Home", None),
            Zone::new("2", "Lost", Some("missing")),
        ];
        assert_eq!(render_zone_tree(&zones), "- Home (1)");
    }

    #[test]
    fn cycles_terminate() {
        // "2" and "3" are each other's parent and "1" lists itself as a child
        // through a duplicate id.
        let zones = vec![
            Zone::new("1", "Home", None),
            Zone::new("1", "Home again", Some("1")),
            Zone::new("2", "Loop A", Some("3")),
            Zone::new("3", "Loop B", Some("2")),
        ];
        let tree = render_zone_tree(&zones);
        assert_eq!(tree, "- Home (1)\n  - Home again (1)");
    }

    #[test]
    fn no_zones_renders_nothing() {
        assert_eq!(render_zone_tree(&[]), "");
    }
}
