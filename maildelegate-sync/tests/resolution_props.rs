//! Order and count properties of intent resolution.

use maildelegate_core::{DelegationIntent, DirectoryUser, Rights, UserId};
use maildelegate_sync::reconcile::resolve_intents;
use rstest::rstest;

fn users() -> Vec<DirectoryUser> {
    [
        ("1", "shared@x.org"),
        ("2", "alice@x.org"),
        ("3", "bob@x.org"),
        ("4", "sales@x.org"),
    ]
    .into_iter()
    .map(|(id, email)| DirectoryUser {
        id: UserId::from(id),
        email: email.to_string(),
    })
    .collect()
}

fn intent(resource: &str, actor: &str) -> DelegationIntent {
    DelegationIntent {
        resource_email: resource.to_string(),
        actor_email: actor.to_string(),
        rights: Rights::new(true, true, false),
    }
}

fn intents() -> Vec<DelegationIntent> {
    vec![
        intent("shared@x.org", "alice@x.org"),
        intent("sales@x.org", "ghost@x.org"),
        intent("sales@x.org", "bob@x.org"),
        intent("ghost@x.org", "bob@x.org"),
        intent("shared@x.org", "shared@x.org"),
    ]
}

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}

#[test]
fn resolution_is_independent_of_user_order() {
    let baseline = resolve_intents(&users(), intents());
    let all = permutations(&users());
    assert_eq!(all.len(), 24);

    for ordering in all {
        let resolution = resolve_intents(&ordering, intents());
        assert_eq!(resolution, baseline, "ordering: {ordering:?}");
    }
}

#[test]
fn resolves_iff_both_emails_present() {
    let resolution = resolve_intents(&users(), intents());
    assert_eq!(resolution.resolved.len(), 3);
    assert_eq!(resolution.unresolved.len(), 2);
    assert_eq!(
        resolution.resolved.len(),
        intents().len() - resolution.unresolved.len()
    );

    let directory = users();
    let known = |email: &str| directory.iter().any(|u| u.email == email);
    for d in &resolution.resolved {
        assert!(known(&d.intent.resource_email) && known(&d.intent.actor_email));
        assert!(!d.resource_id.is_empty() && !d.actor_id.is_empty());
    }
    for i in &resolution.unresolved {
        assert!(!(known(&i.resource_email) && known(&i.actor_email)));
    }
}

#[rstest]
#[case("shared@x.org", "alice@x.org", Some(("1", "2")))]
#[case("alice@x.org", "shared@x.org", Some(("2", "1")))]
#[case("shared@x.org", "nobody@x.org", None)]
#[case("nobody@x.org", "alice@x.org", None)]
#[case("", "", None)]
fn single_intent_resolution(
    #[case] resource: &str,
    #[case] actor: &str,
    #[case] expected: Option<(&str, &str)>,
) {
    let resolution = resolve_intents(&users(), vec![intent(resource, actor)]);
    let got = resolution
        .resolved
        .first()
        .map(|d| (d.resource_id.0.as_str(), d.actor_id.0.as_str()));
    assert_eq!(got, expected);
}
