use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-vehicle mutual exclusion. Booking creation must hold the vehicle's
/// lock from the availability check through the insert, otherwise two
/// callers can both observe "available" and both persist overlapping
/// bookings. Cancellation and reads do not take the lock.
#[derive(Clone, Default)]
pub struct VehicleLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl VehicleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one vehicle. The guard releases on drop, so
    /// every exit path out of check-and-persist releases it.
    pub async fn acquire(&self, vehicle_id: Uuid) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().expect("vehicle lock map poisoned");
            // A strong count of 1 means no holder and no waiter, only the
            // map itself; dropping those entries keeps the registry bounded
            // by the number of vehicles currently being booked.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(vehicle_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }

    #[cfg(test)]
    fn tracked_vehicles(&self) -> usize {
        self.inner.lock().expect("vehicle lock map poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::dates::ranges_overlap;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// N concurrent check-then-act sequences for the same vehicle and the
    /// same range must end with exactly one winner.
    #[tokio::test]
    async fn serializes_check_then_act_per_vehicle() {
        let locks = VehicleLocks::new();
        let vehicle = Uuid::new_v4();
        let booked: Arc<Mutex<Vec<(NaiveDate, NaiveDate)>>> = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = locks.clone();
            let booked = booked.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(vehicle).await;

                let start = d(2024, 6, 10);
                let end = d(2024, 6, 13);
                let free = {
                    let existing = booked.lock().unwrap();
                    !existing
                        .iter()
                        .any(|&(s, e)| ranges_overlap(start, end, s, e))
                };

                // Suspend between check and act; without the lock this is
                // exactly the race window.
                tokio::task::yield_now().await;

                if free {
                    booked.lock().unwrap().push((start, end));
                }
                free
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(booked.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn different_vehicles_do_not_block_each_other() {
        let locks = VehicleLocks::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let _guard_a = locks.acquire(a).await;
        // Would deadlock here if the registry used a single global lock.
        let _guard_b = locks.acquire(b).await;
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let locks = VehicleLocks::new();
        let released = Uuid::new_v4();
        let held = Uuid::new_v4();

        drop(locks.acquire(released).await);
        let _guard = locks.acquire(held).await;

        // The released vehicle's entry is swept on the next acquire; the
        // held one survives.
        assert_eq!(locks.tracked_vehicles(), 1);
    }

    #[tokio::test]
    async fn lock_is_released_on_drop() {
        let locks = VehicleLocks::new();
        let vehicle = Uuid::new_v4();

        drop(locks.acquire(vehicle).await);
        let _reacquired = locks.acquire(vehicle).await;
    }
}
