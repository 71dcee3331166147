use chrono::{NaiveDate, Utc};
use roombook::domain::money::Money;
use roombook::domain::ports::ReservationStoreBox;
use roombook::domain::reservation::{
    GuestDetails, LifecycleState, Reservation, ReservationParts, RoomCategory,
};
use roombook::domain::stay::Stay;
use roombook::error::BookingError;
use roombook::infrastructure::in_memory::InMemoryReservationStore;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

fn reservation(check_in: u32, check_out: u32) -> Reservation {
    ReservationParts {
        id: Uuid::new_v4(),
        guest: GuestDetails {
            name: "Ama Owusu".into(),
            email: "ama@example.com".into(),
            phone: "0241234567".into(),
            guests_count: 1,
            special_requests: None,
        },
        room_category: RoomCategory::StandardRoomOnly,
        stay: Stay::new(
            NaiveDate::from_ymd_opt(2025, 3, check_in).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, check_out).unwrap(),
        )
        .unwrap(),
        status: LifecycleState::Confirmed,
        room_rate: Money::new(dec!(250)).unwrap(),
        initial_payment: Money::ZERO,
        final_payment: Money::ZERO,
        created_at: Utc::now(),
    }
    .into()
}

#[tokio::test]
async fn test_store_as_trait_object() {
    let store: Arc<ReservationStoreBox> = Arc::new(Box::new(InMemoryReservationStore::new()));

    // Verify Send + Sync by spawning tasks that race for three rooms
    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.insert_if_available(reservation(10, 13), 3).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => accepted += 1,
            Err(BookingError::CapacityExceeded { capacity, .. }) => assert_eq!(capacity, 3),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(accepted, 3);
    assert_eq!(store.all().await.unwrap().len(), 3);

    // a stay starting on the last check-out day still fits
    store.insert_if_available(reservation(13, 14), 3).await.unwrap();
}
