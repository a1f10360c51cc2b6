/// Property-based tests using proptest
/// Tests the plan allow-list and lead construction for arbitrary submissions
use investing_coach_api::models::{Lead, LeadIn, Plan};
use investing_coach_api::store::normalize_limit;
use proptest::prelude::*;

fn submission(name: String, email: String, plan: Option<String>) -> LeadIn {
    LeadIn {
        name,
        email,
        phone: None,
        plan,
        message: None,
    }
}

// Property: only the three allow-listed plans survive normalization
proptest! {
    #[test]
    fn unknown_plans_are_always_dropped(plan in "\\PC*") {
        prop_assume!(!["Starter", "Pro", "Elite"].contains(&plan.as_str()));
        prop_assert_eq!(Plan::normalize(Some(plan.as_str())), None);
    }

    #[test]
    fn known_plans_are_kept_exactly(index in 0usize..3) {
        let plan = Plan::ALL[index];
        prop_assert_eq!(Plan::normalize(Some(plan.as_str())), Some(plan));
    }

    #[test]
    fn stored_plan_is_never_arbitrary_text(
        name in "[A-Za-z ]{1,20}",
        email in "[a-z]{1,10}@[a-z]{1,10}\\.com",
        plan in proptest::option::of("\\PC{0,12}")
    ) {
        let lead = Lead::from_submission(submission(name.clone(), email.clone(), plan.clone()));
        let stored = serde_json::to_value(&lead).unwrap();

        match lead.plan {
            Some(p) => prop_assert_eq!(plan.as_deref(), Some(p.as_str())),
            None => prop_assert!(stored["plan"].is_null()),
        }
        prop_assert_eq!(stored["source"].as_str(), Some("website"));
        prop_assert_eq!(stored["name"].as_str(), Some(name.as_str()));
        prop_assert_eq!(stored["email"].as_str(), Some(email.as_str()));
    }
}

// Property: limit normalization never panics and keeps the magnitude
proptest! {
    #[test]
    fn non_zero_limits_keep_magnitude(limit in any::<i64>()) {
        prop_assume!(limit != 0);
        prop_assert_eq!(normalize_limit(limit), Some(limit.unsigned_abs()));
    }
}
