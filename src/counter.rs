use crate::model::BookmarkNode;

/// Number of URL-bearing nodes in the forest. A node carrying both a url
/// and children counts once; its children are not walked, so a malformed
/// leaf can never inflate the total.
pub fn bookmark_count(nodes: &[BookmarkNode]) -> usize {
    nodes
        .iter()
        .map(|node| {
            if node.url.is_some() {
                1
            } else if let Some(children) = &node.children {
                bookmark_count(children)
            } else {
                0
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_leaves_through_nesting_and_ignores_empty_folders() {
        let forest = vec![
            BookmarkNode::folder(
                "Outer",
                vec![BookmarkNode::folder(
                    "Inner",
                    vec![
                        BookmarkNode::bookmark("a", "https://a.com"),
                        BookmarkNode::bookmark("b", "https://b.com"),
                    ],
                )],
            ),
            BookmarkNode::folder("Empty", vec![]),
        ];
        assert_eq!(bookmark_count(&forest), 2);
    }

    #[test]
    fn empty_forest_counts_zero() {
        assert_eq!(bookmark_count(&[]), 0);
    }

    #[test]
    fn url_and_children_counts_once() {
        let malformed = BookmarkNode {
            title: "odd".to_string(),
            url: Some("https://odd.example".to_string()),
            children: Some(vec![BookmarkNode::bookmark("hidden", "https://h.example")]),
        };
        assert_eq!(bookmark_count(&[malformed]), 1);
    }
}
