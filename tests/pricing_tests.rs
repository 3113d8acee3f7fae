mod common;

use common::delhi_card;
use freightdesk::application::pricing::PricingEngine;
use freightdesk::domain::pricing::PricingPolicy;
use freightdesk::domain::ports::{RateCardStore, ReferenceStore};
use freightdesk::domain::rate_card::SectorRateCard;
use freightdesk::domain::reference::{PincodeRecord, StateRecord};
use freightdesk::domain::sector::SectorName;
use freightdesk::domain::shipment::{QuoteRequest, ShipmentMode};
use freightdesk::error::CourierError;
use freightdesk::infrastructure::in_memory::{InMemoryRateCardStore, InMemoryReferenceStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn engine_with(cards: Vec<SectorRateCard>) -> PricingEngine {
    let store = InMemoryRateCardStore::new();
    for card in cards {
        store.upsert(card).await.unwrap();
    }
    let refs = InMemoryReferenceStore::new();
    refs.put_state(StateRecord::new("Delhi", Some(SectorName::Delhi)))
        .await
        .unwrap();
    refs.put_state(StateRecord::new("Kerala", None)).await.unwrap();
    refs.put_pincode(PincodeRecord::new("110001", "Delhi"))
        .await
        .unwrap();
    PricingEngine::new(Box::new(store), Box::new(refs))
}

fn to_delhi(weight: Decimal, mode: ShipmentMode) -> QuoteRequest {
    QuoteRequest {
        customer_id: Some(1),
        destination_pincode: Some("110001".into()),
        weight: Some(weight),
        mode: Some(mode),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_premium_slabs() {
    let engine = engine_with(vec![delhi_card()]).await;
    let cases = [
        (dec!(0.25), dec!(80)),
        (dec!(0.26), dec!(100)),
        (dec!(0.5), dec!(100)),
        (dec!(0.51), dec!(120)),
        (dec!(1.0), dec!(120)),
        (dec!(1.01), dec!(140)),
    ];
    for (weight, expected) in cases {
        let quote = engine.quote(&to_delhi(weight, ShipmentMode::Premium)).await.unwrap();
        assert_eq!(quote.freight_charge, expected, "premium at {weight}kg");
        assert_eq!(quote.sector, SectorName::Delhi);
    }
}

#[tokio::test]
async fn test_premium_wins_over_dox() {
    let engine = engine_with(vec![delhi_card()]).await;
    let mut request = to_delhi(dec!(0.1), ShipmentMode::Premium);
    request.is_dox = true;
    let quote = engine.quote(&request).await.unwrap();
    assert_eq!(quote.freight_charge, dec!(80));
}

#[tokio::test]
async fn test_dox_slabs() {
    let engine = engine_with(vec![delhi_card()]).await;
    let cases = [
        (dec!(0.1), dec!(25)),
        (dec!(0.2), dec!(35)),
        (dec!(0.5), dec!(50)),
        (dec!(0.75), dec!(80)),
        (dec!(1.2), dec!(110)),
    ];
    for (weight, expected) in cases {
        let mut request = to_delhi(weight, ShipmentMode::Surface);
        request.is_dox = true;
        let quote = engine.quote(&request).await.unwrap();
        assert_eq!(quote.freight_charge, expected, "dox at {weight}kg");
    }
}

#[tokio::test]
async fn test_bulk_minimum_and_rounding() {
    let engine = engine_with(vec![delhi_card()]).await;

    // Below the 5kg minimum: charged as 5kg at the 10kg bracket.
    let quote = engine.quote(&to_delhi(dec!(2), ShipmentMode::Surface)).await.unwrap();
    assert_eq!(quote.freight_charge, dec!(60));

    // 10.2kg picks the 15kg bracket, then rounds up to 11kg.
    let quote = engine.quote(&to_delhi(dec!(10.2), ShipmentMode::Surface)).await.unwrap();
    assert_eq!(quote.freight_charge, dec!(121));

    let quote = engine.quote(&to_delhi(dec!(25), ShipmentMode::Surface)).await.unwrap();
    assert_eq!(quote.freight_charge, dec!(225));
}

#[tokio::test]
async fn test_air_skips_unset_brackets() {
    let engine = engine_with(vec![delhi_card()]).await;

    // air_upto15 and air_upto20 are unset: 12kg falls to upto20, which reads as zero.
    let quote = engine.quote(&to_delhi(dec!(12), ShipmentMode::Air)).await.unwrap();
    assert_eq!(quote.freight_charge, Decimal::ZERO);

    let quote = engine.quote(&to_delhi(dec!(1), ShipmentMode::Air)).await.unwrap();
    assert_eq!(quote.freight_charge, dec!(120));
}

#[tokio::test]
async fn test_waybill_surcharge_threshold() {
    let engine = engine_with(vec![delhi_card()]).await;

    let mut request = to_delhi(dec!(1), ShipmentMode::Premium);
    request.invoice_value = Some(dec!(49999));
    let quote = engine.quote(&request).await.unwrap();
    assert_eq!(quote.waybill_surcharge, Decimal::ZERO);

    request.invoice_value = Some(dec!(50000));
    let quote = engine.quote(&request).await.unwrap();
    assert_eq!(quote.waybill_surcharge, dec!(100));
    assert_eq!(quote.other_expense, Decimal::ZERO);
    assert_eq!(quote.total(), dec!(220));
}

#[tokio::test]
async fn test_surcharge_only_for_matching_provider() {
    let mut card = delhi_card();
    card.service_provider = Some("Blue Dart".into());
    let engine = engine_with(vec![card]).await;

    let mut request = to_delhi(dec!(1), ShipmentMode::Premium);
    request.invoice_value = Some(dec!(100000));
    let quote = engine.quote(&request).await.unwrap();
    assert_eq!(quote.waybill_surcharge, Decimal::ZERO);
}

#[tokio::test]
async fn test_custom_policy() {
    let store = InMemoryRateCardStore::new();
    let mut card = delhi_card();
    card.service_provider = Some("acme".into());
    store.upsert(card).await.unwrap();
    let policy = PricingPolicy {
        surcharge_provider: "ACME".into(),
        surcharge_threshold: dec!(1000),
        surcharge_rate: dec!(0.01),
    };
    let engine = PricingEngine::with_policy(
        Box::new(store),
        Box::new(InMemoryReferenceStore::new()),
        policy,
    );

    let mut request = to_delhi(dec!(1), ShipmentMode::Premium);
    request.destination_pincode = None;
    request.state = Some("New Delhi".into());
    request.invoice_value = Some(dec!(2000));
    let quote = engine.quote(&request).await.unwrap();
    assert_eq!(quote.sector, SectorName::Delhi);
    assert_eq!(quote.waybill_surcharge, dec!(20));
}

#[tokio::test]
async fn test_missing_card_names_the_sector() {
    let engine = engine_with(vec![delhi_card()]).await;
    let request = QuoteRequest {
        customer_id: Some(1),
        state: Some("Assam".into()),
        weight: Some(dec!(1)),
        mode: Some(ShipmentMode::Surface),
        ..Default::default()
    };
    let err = engine.quote(&request).await.unwrap_err();
    match &err {
        CourierError::RateNotFound { customer_id, sector } => {
            assert_eq!(*customer_id, 1);
            assert_eq!(*sector, SectorName::NorthEast);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("North East"));
}

#[tokio::test]
async fn test_registered_state_without_sector_falls_back() {
    let mut card = delhi_card();
    card.sector = SectorName::RestOfIndia;
    let engine = engine_with(vec![card]).await;
    let request = QuoteRequest {
        customer_id: Some(1),
        state: Some("kerala".into()),
        weight: Some(dec!(0.3)),
        mode: Some(ShipmentMode::Premium),
        ..Default::default()
    };
    let quote = engine.quote(&request).await.unwrap();
    assert_eq!(quote.sector, SectorName::RestOfIndia);
    assert_eq!(quote.freight_charge, dec!(100));
}

#[tokio::test]
async fn test_invalid_requests() {
    let engine = engine_with(vec![delhi_card()]).await;

    let mut request = to_delhi(dec!(1), ShipmentMode::Surface);
    request.customer_id = None;
    assert!(matches!(
        engine.quote(&request).await,
        Err(CourierError::MissingRequiredField("customer"))
    ));

    let mut request = to_delhi(dec!(1), ShipmentMode::Surface);
    request.destination_pincode = Some("  ".into());
    assert!(matches!(
        engine.quote(&request).await,
        Err(CourierError::MissingRequiredField("destination"))
    ));

    let mut request = to_delhi(dec!(1), ShipmentMode::Surface);
    request.mode = None;
    assert!(matches!(
        engine.quote(&request).await,
        Err(CourierError::MissingRequiredField("mode"))
    ));

    let request = to_delhi(Decimal::ZERO, ShipmentMode::Surface);
    assert!(matches!(
        engine.quote(&request).await,
        Err(CourierError::InvalidWeight(_))
    ));
}

#[tokio::test]
async fn test_repeated_quotes_agree() {
    let engine = engine_with(vec![delhi_card()]).await;
    let mut request = to_delhi(dec!(7.5), ShipmentMode::Surface);
    request.invoice_value = Some(dec!(65000));

    let first = engine.quote(&request).await.unwrap();
    for _ in 0..3 {
        assert_eq!(engine.quote(&request).await.unwrap(), first);
    }
    let card = engine.rate_card(1, SectorName::Delhi).await.unwrap();
    assert_eq!(card, engine.rate_card(1, SectorName::Delhi).await.unwrap());
}

#[tokio::test]
async fn test_oversized_weight_is_rejected_not_panicking() {
    let engine = engine_with(vec![delhi_card()]).await;
    let weight: Decimal = "10000000000000000000000000000".parse().unwrap();

    for mode in [ShipmentMode::Surface, ShipmentMode::Air, ShipmentMode::Premium] {
        let result = engine.quote(&to_delhi(weight, mode)).await;
        assert!(
            matches!(result, Err(CourierError::InvalidWeight(w)) if w == weight),
            "{mode:?}: {result:?}"
        );
    }

    // The engine keeps answering afterwards.
    let quote = engine.quote(&to_delhi(dec!(2), ShipmentMode::Surface)).await.unwrap();
    assert_eq!(quote.freight_charge, dec!(60));
}

#[tokio::test]
async fn test_oversized_invoice_value_is_rejected() {
    let engine = engine_with(vec![delhi_card()]).await;
    let mut request = to_delhi(dec!(1), ShipmentMode::Premium);
    request.invoice_value = Some(Decimal::MAX);
    // 0.2% of the maximum fits, so this one succeeds.
    assert!(engine.quote(&request).await.is_ok());

    let store = InMemoryRateCardStore::new();
    store.upsert(delhi_card()).await.unwrap();
    let engine = PricingEngine::with_policy(
        Box::new(store),
        Box::new(InMemoryReferenceStore::new()),
        PricingPolicy {
            surcharge_rate: dec!(3),
            ..PricingPolicy::default()
        },
    );
    request.destination_pincode = None;
    request.state = Some("Delhi".into());
    assert!(matches!(
        engine.quote(&request).await,
        Err(CourierError::InvalidAmount(_))
    ));
}
