//! GraphQL payloads, patch mailboxes and mailbox helpers for the BDD tests.

use serde_json::{Value, json};

/// A thread node as returned inside `repository.thread` or a connection.
pub(crate) fn thread_node(typename: &str, number: u64, url: &str) -> Value {
    json!({
        "__typename": typename,
        "id": format!("T_{number}"),
        "number": number,
        "title": format!("Thread {number}"),
        "url": url,
        "author": { "login": "octocat", "name": "The Octocat", "email": "octocat@example.com" },
        "body": format!("Opening post of {number}"),
        "createdAt": "2021-03-04T05:06:07Z"
    })
}

/// A comment node with the given database id.
pub(crate) fn comment_node(database_id: u64) -> Value {
    json!({
        "id": format!("IC_{database_id}"),
        "databaseId": database_id,
        "author": { "login": "hubber", "name": null, "email": null },
        "body": format!("Comment {database_id}"),
        "createdAt": "2021-03-05T00:00:00Z"
    })
}

/// A `git format-patch` mailbox with `commits` commits.
pub(crate) fn patch_series(commits: u64) -> String {
    (1..=commits)
        .map(|index| {
            format!(
                "From {index:040} Mon Sep 17 00:00:00 2001\n\
                 From: The Octocat <octocat@example.com>\n\
                 Date: Thu, 4 Mar 2021 05:06:07 +0000\n\
                 Subject: [PATCH {index}/{commits}] Change {index}\n\
                 \n\
                 diff --git a/file b/file\n"
            )
        })
        .collect()
}

/// Splits an mbox stream at its `From ` separator lines.
pub(crate) fn split_mailbox(mailbox: &str) -> Vec<String> {
    let mut messages: Vec<String> = Vec::new();
    for line in mailbox.split_inclusive('\n') {
        if line.starts_with("From ") {
            messages.push(line.to_owned());
        } else if let Some(current) = messages.last_mut() {
            current.push_str(line);
        }
    }
    messages
}
