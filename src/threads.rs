use std::collections::HashMap;

use crate::models::{Comment, CommentThread};

/// partition_comments
///
/// Splits comments into thread roots and replies in one pass, keeping the
/// input order inside each side.
pub fn partition_comments(comments: &[Comment]) -> (Vec<&Comment>, Vec<&Comment>) {
    comments.iter().partition(|comment| comment.is_root())
}

/// group_threads
///
/// Groups comments into one thread per root, in root order. Replies are attached
/// to the root at the top of their parent chain, so a reply to a reply still
/// lands in the right thread. Replies whose chain never reaches a root (missing
/// parent, or a cycle) are left out of every thread.
pub fn group_threads(comments: &[Comment]) -> Vec<CommentThread> {
    let by_id: HashMap<&str, &Comment> = comments
        .iter()
        .map(|comment| (comment.id.as_str(), comment))
        .collect();

    let mut threads: Vec<CommentThread> = Vec::new();
    let mut slot_of_root: HashMap<&str, usize> = HashMap::new();

    for comment in comments.iter().filter(|comment| comment.is_root()) {
        slot_of_root.insert(comment.id.as_str(), threads.len());
        threads.push(CommentThread {
            comment: comment.clone(),
            replies: Vec::new(),
            contain_new_reply: false,
        });
    }

    for reply in comments.iter().filter(|comment| !comment.is_root()) {
        let Some(root_id) = find_root(reply, &by_id, comments.len()) else {
            tracing::debug!(reply_id = %reply.id, "reply has no reachable root, skipped");
            continue;
        };
        if let Some(&slot) = slot_of_root.get(root_id) {
            let thread = &mut threads[slot];
            thread.contain_new_reply |= reply.is_new;
            thread.replies.push(reply.clone());
        }
    }

    threads
}

/// Walks the parent chain up to a root. Gives up after `max_hops` steps, which
/// is only reachable when the chain loops.
fn find_root<'a>(
    reply: &'a Comment,
    by_id: &HashMap<&'a str, &'a Comment>,
    max_hops: usize,
) -> Option<&'a str> {
    let mut current = reply;
    for _ in 0..max_hops {
        match current.parent_id.as_deref() {
            None => return Some(current.id.as_str()),
            Some(parent_id) => current = *by_id.get(parent_id)?,
        }
    }
    None
}
