//! Integration tests for the property, lead, marketplace and audit
//! repositories.

use homestead_db::models::audit::{AuditQuery, CreateAuditLog};
use homestead_db::models::household_item::{CreateHouseholdItem, ItemListParams, ItemScreening};
use homestead_db::models::lead::{LeadListParams, NewLead};
use homestead_db::models::profile::UpsertProfile;
use homestead_db::models::property::{CreateProperty, PropertyListParams, UpdateProperty};
use homestead_db::repositories::{
    AuditRepo, HouseholdItemRepo, LeadRepo, ProfileRepo, PropertyRepo, StatsRepo,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

fn property(city: &str, rent: i64) -> CreateProperty {
    CreateProperty {
        title: format!("Flat in {city}"),
        description: Some("Bright and quiet".to_string()),
        property_type: "apartment".to_string(),
        city: city.to_string(),
        address: None,
        monthly_rent_cents: rent,
        bedrooms: 1,
        bathrooms: 1,
    }
}

fn lead(name: &str, score: i16, temperature: &str) -> NewLead {
    NewLead {
        property_id: None,
        name: name.to_string(),
        email: Some(format!("{name}@example.com")),
        phone: None,
        message: None,
        budget_cents: None,
        move_in_date: None,
        source: "web".to_string(),
        score,
        temperature: temperature.to_string(),
        qualification_json: None,
    }
}

fn item(title: &str) -> CreateHouseholdItem {
    CreateHouseholdItem {
        title: title.to_string(),
        description: None,
        category: "furniture".to_string(),
        condition: "good".to_string(),
        price_cents: 5_000,
        city: "Porto".to_string(),
    }
}

fn screening(status: &str, score: i16) -> ItemScreening {
    ItemScreening {
        status: status.to_string(),
        fraud_score: score,
        fraud_flags: json!([]),
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_upsert_keeps_role_and_unset_fields(pool: PgPool) {
    let id = Uuid::new_v4();
    let first = UpsertProfile {
        full_name: Some("Rita".to_string()),
        phone: Some("+351900000000".to_string()),
    };
    ProfileRepo::upsert(&pool, id, "owner", &first).await.unwrap();

    let second = UpsertProfile {
        full_name: Some("Rita Sousa".to_string()),
        phone: None,
    };
    let updated = ProfileRepo::upsert(&pool, id, "customer", &second).await.unwrap();

    assert_eq!(updated.full_name.as_deref(), Some("Rita Sousa"));
    assert_eq!(updated.phone.as_deref(), Some("+351900000000"));
    assert_eq!(updated.role, "owner");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_only_published_properties_are_listed(pool: PgPool) {
    let owner = Uuid::new_v4();
    let draft = PropertyRepo::create(&pool, owner, &property("Lisbon", 100_000)).await.unwrap();
    let public = PropertyRepo::create(&pool, owner, &property("Lisbon", 90_000)).await.unwrap();
    PropertyRepo::transition(&pool, public.id, "draft", "published").await.unwrap();

    let listed = PropertyRepo::list_published(&pool, &PropertyListParams::default(), 20, 0)
        .await
        .unwrap();

    assert_eq!(draft.status, "draft");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, public.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_property_search_filters(pool: PgPool) {
    let owner = Uuid::new_v4();
    for (city, rent) in [("Lisbon", 80_000), ("Lisbon", 150_000), ("Porto", 90_000)] {
        let p = PropertyRepo::create(&pool, owner, &property(city, rent)).await.unwrap();
        PropertyRepo::transition(&pool, p.id, "draft", "published").await.unwrap();
    }

    let params = PropertyListParams {
        city: Some("lisbon".to_string()),
        max_rent_cents: Some(100_000),
        ..Default::default()
    };
    let listed = PropertyRepo::list_published(&pool, &params, 20, 0).await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].monthly_rent_cents, 80_000);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_property_update_keeps_unset_fields(pool: PgPool) {
    let p = PropertyRepo::create(&pool, Uuid::new_v4(), &property("Faro", 70_000))
        .await
        .unwrap();

    let patch = UpdateProperty {
        monthly_rent_cents: Some(75_000),
        ..Default::default()
    };
    let updated = PropertyRepo::update(&pool, p.id, "draft", &patch).await.unwrap().unwrap();

    assert_eq!(updated.monthly_rent_cents, 75_000);
    assert_eq!(updated.city, "Faro");
    assert_eq!(updated.description.as_deref(), Some("Bright and quiet"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_property_update_with_stale_status_matches_nothing(pool: PgPool) {
    let p = PropertyRepo::create(&pool, Uuid::new_v4(), &property("Faro", 70_000))
        .await
        .unwrap();
    PropertyRepo::transition(&pool, p.id, "draft", "published").await.unwrap();

    let patch = UpdateProperty {
        description: Some("Edited after a draft-time read".to_string()),
        ..Default::default()
    };
    let stale = PropertyRepo::update(&pool, p.id, "draft", &patch).await.unwrap();

    assert!(stale.is_none());
    let current = PropertyRepo::find_by_id(&pool, p.id).await.unwrap().unwrap();
    assert_eq!(current.description.as_deref(), Some("Bright and quiet"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transition_requires_expected_status(pool: PgPool) {
    let p = PropertyRepo::create(&pool, Uuid::new_v4(), &property("Faro", 70_000))
        .await
        .unwrap();

    let wrong_from = PropertyRepo::transition(&pool, p.id, "published", "archived")
        .await
        .unwrap();
    assert!(wrong_from.is_none());

    let archived = PropertyRepo::transition(&pool, p.id, "draft", "archived")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(archived.status, "archived");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_publish_revision_rejects_edited_row(pool: PgPool) {
    let p = PropertyRepo::create(&pool, Uuid::new_v4(), &property("Faro", 70_000))
        .await
        .unwrap();
    let checked_at = p.updated_at;

    let patch = UpdateProperty {
        title: Some("Changed after the check".to_string()),
        ..Default::default()
    };
    PropertyRepo::update(&pool, p.id, "draft", &patch).await.unwrap().unwrap();

    let published = PropertyRepo::publish_revision(&pool, p.id, "draft", checked_at)
        .await
        .unwrap();
    assert!(published.is_none());

    let fresh = PropertyRepo::find_by_id(&pool, p.id).await.unwrap().unwrap();
    let published = PropertyRepo::publish_revision(&pool, p.id, "draft", fresh.updated_at)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(published.status, "published");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rent_must_be_positive(pool: PgPool) {
    let result = PropertyRepo::create(&pool, Uuid::new_v4(), &property("Faro", 0)).await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_leads_listed_hottest_first(pool: PgPool) {
    LeadRepo::create(&pool, &lead("cold", 10, "cold")).await.unwrap();
    LeadRepo::create(&pool, &lead("hot", 85, "hot")).await.unwrap();
    LeadRepo::create(&pool, &lead("warm", 50, "warm")).await.unwrap();

    let all = LeadRepo::list(&pool, &LeadListParams::default(), 20, 0).await.unwrap();
    let names: Vec<&str> = all.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["hot", "warm", "cold"]);

    let params = LeadListParams {
        temperature: Some("warm".to_string()),
        ..Default::default()
    };
    let warm = LeadRepo::list(&pool, &params, 20, 0).await.unwrap();
    assert_eq!(warm.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lead_requires_contact(pool: PgPool) {
    let mut input = lead("nobody", 0, "cold");
    input.email = None;
    assert!(LeadRepo::create(&pool, &input).await.is_err());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lead_requalification_overwrites_score(pool: PgPool) {
    let created = LeadRepo::create(&pool, &lead("ivo", 20, "cold")).await.unwrap();

    let updated = LeadRepo::update_qualification(&pool, created.id, 75, "hot", &json!({"source": "combined"}))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.score, 75);
    assert_eq!(updated.temperature, "hot");
    assert_eq!(updated.qualification_json, Some(json!({"source": "combined"})));
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_items_under_review_are_hidden(pool: PgPool) {
    let seller = Uuid::new_v4();
    HouseholdItemRepo::create(&pool, seller, &item("Sofa"), &screening("available", 5))
        .await
        .unwrap();
    HouseholdItemRepo::create(&pool, seller, &item("Cheap iPhone"), &screening("under_review", 80))
        .await
        .unwrap();

    let listed = HouseholdItemRepo::list_available(&pool, &ItemListParams::default(), 20, 0)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Sofa");

    let queue = HouseholdItemRepo::list_under_review(&pool).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].fraud_score, 80);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_record_screening_replaces_verdict(pool: PgPool) {
    let seller = Uuid::new_v4();
    let low = HouseholdItemRepo::create(&pool, seller, &item("Sofa"), &screening("under_review", 65))
        .await
        .unwrap();
    let high = HouseholdItemRepo::create(&pool, seller, &item("Desk"), &screening("available", 0))
        .await
        .unwrap();

    let rescreened = HouseholdItemRepo::record_screening(
        &pool,
        high.id,
        &ItemScreening {
            status: "under_review".to_string(),
            fraud_score: 90,
            fraud_flags: json!(["advance_payment"]),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(rescreened.fraud_score, 90);
    assert_eq!(rescreened.fraud_flags, json!(["advance_payment"]));

    let queue = HouseholdItemRepo::list_under_review(&pool).await.unwrap();
    let order: Vec<i64> = queue.iter().map(|i| i.id).collect();
    assert_eq!(order, vec![high.id, low.id]);
}

// ---------------------------------------------------------------------------
// Audit and stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_audit_query_filters_by_entity(pool: PgPool) {
    for (action, entity) in [("property_create", "property"), ("lead_status", "lead")] {
        AuditRepo::insert(
            &pool,
            &CreateAuditLog {
                actor_id: Some(Uuid::new_v4()),
                action: action.to_string(),
                entity_type: entity.to_string(),
                entity_id: Some(1),
                details_json: None,
                ip_address: None,
            },
        )
        .await
        .unwrap();
    }

    let params = AuditQuery {
        entity_type: Some("lead".to_string()),
        ..Default::default()
    };
    let rows = AuditRepo::query(&pool, &params, 20, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].action, "lead_status");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_platform_stats_counts(pool: PgPool) {
    let owner = Uuid::new_v4();
    PropertyRepo::create(&pool, owner, &property("Braga", 60_000)).await.unwrap();
    LeadRepo::create(&pool, &lead("h", 90, "hot")).await.unwrap();
    HouseholdItemRepo::create(&pool, owner, &item("Lamp"), &screening("under_review", 70))
        .await
        .unwrap();

    let stats = StatsRepo::platform_stats(&pool).await.unwrap();

    assert_eq!(stats.properties_by_status.len(), 1);
    assert_eq!(stats.properties_by_status[0].label, "draft");
    assert_eq!(stats.properties_by_status[0].count, 1);
    assert!(stats.bookings_by_status.is_empty());
    assert_eq!(stats.leads_by_temperature[0].label, "hot");
    assert_eq!(stats.items_under_review, 1);
}
