use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rota_core::{
    BoundPassenger, ExcursionSettings, PaymentMethod, PaymentPlan, Reservation,
    ReservationPassenger, ReservationStatus, ReservationStore, SeatAssignment, SeatCategory,
    SettingsPatch, StoreError,
};
use sqlx::PgPool;
use uuid::Uuid;

/// `ReservationStore` backed by Postgres.
///
/// Uniqueness of (category, seat number) among non-cancelled reservations is
/// carried by a partial unique index on `passengers (seat_category,
/// seat_number) WHERE active`; cancelling a reservation clears the flag so
/// the seats free up.
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct SettingsRow {
    id: Uuid,
    leito_price_cents: i32,
    semi_leito_price_cents: i32,
    trip_start: NaiveDate,
    trip_end: NaiveDate,
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    total_cents: i32,
    payment_method: String,
    installments: i32,
    paid_installments: i32,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: Uuid,
    reservation_id: Uuid,
    name: String,
    document: String,
    city: String,
    group_name: String,
    contact: String,
    seat_category: String,
    seat_number: i32,
}

impl From<SettingsRow> for ExcursionSettings {
    fn from(row: SettingsRow) -> Self {
        ExcursionSettings {
            id: row.id,
            leito_price_cents: row.leito_price_cents,
            semi_leito_price_cents: row.semi_leito_price_cents,
            trip_start: row.trip_start,
            trip_end: row.trip_end,
        }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn parse_category(s: &str) -> Result<SeatCategory, StoreError> {
    s.parse()
        .map_err(|_| StoreError::Backend(format!("unknown seat category in row: {s}")))
}

fn parse_status(s: &str) -> Result<ReservationStatus, StoreError> {
    match s {
        "PENDING" => Ok(ReservationStatus::Pending),
        "CONFIRMED" => Ok(ReservationStatus::Confirmed),
        "CANCELLED" => Ok(ReservationStatus::Cancelled),
        other => Err(StoreError::Backend(format!(
            "unknown reservation status in row: {other}"
        ))),
    }
}

fn parse_method(s: &str) -> Result<PaymentMethod, StoreError> {
    match s {
        "pix" => Ok(PaymentMethod::Pix),
        "credit_card" => Ok(PaymentMethod::CreditCard),
        other => Err(StoreError::Backend(format!(
            "unknown payment method in row: {other}"
        ))),
    }
}

fn row_to_passenger(row: PassengerRow) -> Result<ReservationPassenger, StoreError> {
    Ok(ReservationPassenger {
        seat_category: parse_category(&row.seat_category)?,
        id: row.id,
        reservation_id: row.reservation_id,
        name: row.name,
        document: row.document,
        city: row.city,
        group_name: row.group_name,
        contact: row.contact,
        seat_number: row.seat_number,
    })
}

impl PgReservationStore {
    async fn hydrate(&self, row: ReservationRow) -> Result<Reservation, StoreError> {
        let passenger_rows: Vec<PassengerRow> = sqlx::query_as(
            r#"
            SELECT id, reservation_id, name, document, city, group_name, contact,
                   seat_category, seat_number
            FROM passengers
            WHERE reservation_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let passengers = passenger_rows
            .into_iter()
            .map(row_to_passenger)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Reservation {
            id: row.id,
            created_at: row.created_at,
            total_cents: row.total_cents,
            payment_method: parse_method(&row.payment_method)?,
            installments: row.installments,
            paid_installments: row.paid_installments,
            status: parse_status(&row.status)?,
            passengers,
        })
    }

    async fn fetch_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<Reservation>, StoreError> {
        let mut reservations = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(reservation) = self.get_reservation(id).await? {
                reservations.push(reservation);
            }
        }
        Ok(reservations)
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn read_settings(&self) -> Result<ExcursionSettings, StoreError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT id, leito_price_cents, semi_leito_price_cents, trip_start, trip_end
             FROM excursion_settings LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // First read ever: seed the singleton row with the defaults.
        let defaults = ExcursionSettings::default_row();
        let row: SettingsRow = sqlx::query_as(
            r#"
            INSERT INTO excursion_settings (id, leito_price_cents, semi_leito_price_cents, trip_start, trip_end)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, leito_price_cents, semi_leito_price_cents, trip_start, trip_end
            "#,
        )
        .bind(defaults.id)
        .bind(defaults.leito_price_cents)
        .bind(defaults.semi_leito_price_cents)
        .bind(defaults.trip_start)
        .bind(defaults.trip_end)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.into())
    }

    async fn update_settings(
        &self,
        patch: &SettingsPatch,
    ) -> Result<ExcursionSettings, StoreError> {
        // Make sure the singleton row exists before patching it.
        let current = self.read_settings().await?;

        let row: SettingsRow = sqlx::query_as(
            r#"
            UPDATE excursion_settings
            SET leito_price_cents = COALESCE($2, leito_price_cents),
                semi_leito_price_cents = COALESCE($3, semi_leito_price_cents),
                trip_start = COALESCE($4, trip_start),
                trip_end = COALESCE($5, trip_end),
                updated_at = now()
            WHERE id = $1
            RETURNING id, leito_price_cents, semi_leito_price_cents, trip_start, trip_end
            "#,
        )
        .bind(current.id)
        .bind(patch.leito_price_cents)
        .bind(patch.semi_leito_price_cents)
        .bind(patch.trip_start)
        .bind(patch.trip_end)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.into())
    }

    async fn occupied_seats(&self) -> Result<Vec<SeatAssignment>, StoreError> {
        let rows: Vec<(String, i32)> = sqlx::query_as(
            r#"
            SELECT p.seat_category, p.seat_number
            FROM passengers p
            JOIN reservations r ON r.id = p.reservation_id
            WHERE r.status <> 'CANCELLED'
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter()
            .map(|(category, seat_number)| {
                Ok(SeatAssignment {
                    category: parse_category(&category)?,
                    seat_number,
                })
            })
            .collect()
    }

    async fn insert_reservation(
        &self,
        total_cents: i32,
        plan: PaymentPlan,
    ) -> Result<Uuid, StoreError> {
        let reservation_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO reservations (id, total_cents, payment_method, installments, paid_installments, status)
            VALUES ($1, $2, $3, $4, 0, 'PENDING')
            "#,
        )
        .bind(reservation_id)
        .bind(total_cents)
        .bind(plan.method.as_str())
        .bind(plan.installments)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(reservation_id)
    }

    async fn insert_passengers(
        &self,
        reservation_id: Uuid,
        passengers: &[BoundPassenger],
    ) -> Result<(), StoreError> {
        // One row at a time so a uniqueness conflict names the exact seat.
        for passenger in passengers {
            let result = sqlx::query(
                r#"
                INSERT INTO passengers (id, reservation_id, name, document, city, group_name, contact, seat_category, seat_number)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(reservation_id)
            .bind(&passenger.details.name)
            .bind(&passenger.details.document)
            .bind(&passenger.details.city)
            .bind(&passenger.details.group_name)
            .bind(&passenger.details.contact)
            .bind(passenger.details.seat_category.as_str())
            .bind(passenger.seat_number)
            .execute(&self.pool)
            .await;

            if let Err(err) = result {
                if let sqlx::Error::Database(db_err) = &err {
                    if db_err.is_unique_violation() {
                        return Err(StoreError::SeatTaken {
                            category: passenger.details.seat_category,
                            seat_number: passenger.seat_number,
                        });
                    }
                }
                return Err(backend(err));
            }
        }
        Ok(())
    }

    async fn delete_reservation(&self, reservation_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(reservation_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(reservation_id));
        }
        Ok(())
    }

    async fn update_reservation(
        &self,
        reservation_id: Uuid,
        paid_installments: i32,
        status: Option<ReservationStatus>,
    ) -> Result<(), StoreError> {
        // The status write and the seat-release flag must land together;
        // a cancellation that half-applies would report seats free while
        // the unique index still holds them.
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET paid_installments = $2,
                status = COALESCE($3, status),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(reservation_id)
        .bind(paid_installments)
        .bind(status.map(|s| s.as_str()))
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(reservation_id));
        }

        // A cancelled reservation's seats go back into circulation.
        if status == Some(ReservationStatus::Cancelled) {
            sqlx::query("UPDATE passengers SET active = FALSE WHERE reservation_id = $1")
                .bind(reservation_id)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn advance_installment(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, StoreError> {
        // Relative increment, guarded in the same statement, so two admin
        // sessions paying at once each advance the counter by one.
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            UPDATE reservations
            SET paid_installments = paid_installments + 1,
                status = CASE WHEN paid_installments = 0 THEN 'CONFIRMED' ELSE status END,
                updated_at = now()
            WHERE id = $1
              AND status <> 'CANCELLED'
              AND paid_installments < installments
            RETURNING id, total_cents, payment_method, installments, paid_installments, status, created_at
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => {
                if self.get_reservation(reservation_id).await?.is_none() {
                    return Err(StoreError::NotFound(reservation_id));
                }
                Ok(None)
            }
        }
    }

    async fn get_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, StoreError> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            SELECT id, total_cents, payment_method, installments, paid_installments, status, created_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_document(&self, document: &str) -> Result<Vec<Reservation>, StoreError> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT r.id
            FROM reservations r
            WHERE EXISTS (
                SELECT 1 FROM passengers p
                WHERE p.reservation_id = r.id AND p.document = $1
            )
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(document)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        self.fetch_by_ids(ids.into_iter().map(|(id,)| id).collect())
            .await
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM reservations ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;

        self.fetch_by_ids(ids.into_iter().map(|(id,)| id).collect())
            .await
    }
}
