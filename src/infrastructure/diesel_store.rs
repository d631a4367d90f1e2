use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderLineItem};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{OrderStore, ProductStore, StockAdjustment, Store, StoreTx};
use crate::domain::product::Product;
use crate::domain::status::OrderStatus;
use crate::schema::{order_lines, orders, products};

use super::models::{NewOrderLineRow, OrderLineRow, OrderRow, ProductRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
                DomainError::ConcurrencyConflict(info.message().to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            // Diesel reports SQLSTATE 40P01 as an unknown kind.
            diesel::result::Error::DatabaseError(_, info)
                if info.message().contains("deadlock detected") =>
            {
                DomainError::ConcurrencyConflict(info.message().to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// PostgreSQL-backed store. Each transaction runs on one pooled connection.
///
/// Stock writes are single conditional `UPDATE`s, so the row lock taken by the
/// first writer makes a concurrent writer re-check the condition against the
/// committed quantity. Lifecycle operations lock their products up front in id
/// order, so two orders touching the same products cannot deadlock.
#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for DieselStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, DomainError>,
    {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction::<_, DomainError, _>(|conn| f(&mut DieselTx { conn }))
    }
}

struct DieselTx<'a> {
    conn: &'a mut PgConnection,
}

impl DieselTx<'_> {
    /// Line items of every order in `order_ids`, keyed by order and kept in
    /// their stored position.
    fn load_items(
        &mut self,
        order_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<OrderLineItem>>, DomainError> {
        let rows: Vec<(OrderLineRow, ProductRow)> = order_lines::table
            .inner_join(products::table)
            .filter(order_lines::order_id.eq_any(order_ids.to_vec()))
            .order((order_lines::order_id, order_lines::position.asc()))
            .select((OrderLineRow::as_select(), ProductRow::as_select()))
            .load(self.conn)?;

        let mut grouped: HashMap<Uuid, Vec<OrderLineItem>> = HashMap::new();
        for (line, product) in rows {
            grouped
                .entry(line.order_id)
                .or_default()
                .push(line.into_item(product));
        }
        Ok(grouped)
    }
}

impl ProductStore for DieselTx<'_> {
    fn get_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(self.conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn save_product(&mut self, product: &Product) -> Result<Product, DomainError> {
        let row = ProductRow::from(product);
        let saved = diesel::insert_into(products::table)
            .values(&row)
            .on_conflict(products::id)
            .do_update()
            .set(&row)
            .returning(ProductRow::as_returning())
            .get_result(self.conn)?;
        Ok(saved.into())
    }

    fn delete_product(&mut self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = diesel::delete(products::table.filter(products::id.eq(id))).execute(self.conn)?;
        Ok(deleted > 0)
    }

    fn lock_products(&mut self, ids: &[Uuid]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        products::table
            .select(products::id)
            .filter(products::id.eq_any(ids.to_vec()))
            .order(products::id)
            .for_update()
            .load::<Uuid>(self.conn)?;
        Ok(())
    }

    fn adjust_stock(&mut self, id: Uuid, delta: i32) -> Result<StockAdjustment, DomainError> {
        let updated = diesel::update(
            products::table
                .filter(products::id.eq(id))
                .filter((products::quantity + delta).ge(0)),
        )
        .set(products::quantity.eq(products::quantity + delta))
        .returning(ProductRow::as_returning())
        .get_result(self.conn)
        .optional()?;

        if let Some(row) = updated {
            return Ok(StockAdjustment::Applied(row.into()));
        }
        Ok(match self.get_product(id)? {
            Some(product) => StockAdjustment::Insufficient(product),
            None => StockAdjustment::Missing,
        })
    }

    fn find_products(
        &mut self,
        reference: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let mut query = products::table.into_boxed();
        let mut count = products::table.into_boxed();
        if let Some(reference) = reference {
            let pattern = format!("%{}%", reference);
            query = query.filter(products::reference.like(pattern.clone()));
            count = count.filter(products::reference.like(pattern));
        }

        let total: i64 = count.count().get_result(self.conn)?;
        let rows = query
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .limit(page.limit)
            .offset(page.offset())
            .load(self.conn)?;

        Ok(Page::new(
            rows.into_iter().map(Product::from).collect(),
            total,
            page,
        ))
    }
}

impl OrderStore for DieselTx<'_> {
    fn get_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let row = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(self.conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.load_items(&[id])?.remove(&id).unwrap_or_default();
        row.into_order(items).map(Some)
    }

    fn save_order(&mut self, order: &Order) -> Result<Order, DomainError> {
        let row = OrderRow::from_order(order);
        diesel::insert_into(orders::table)
            .values(&row)
            .on_conflict(orders::id)
            .do_update()
            .set(&row)
            .execute(self.conn)?;

        diesel::delete(order_lines::table.filter(order_lines::order_id.eq(order.id)))
            .execute(self.conn)?;

        let lines: Vec<NewOrderLineRow> = order
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| NewOrderLineRow {
                id: item.id,
                order_id: order.id,
                product_id: item.product_id,
                position: position as i32,
                quantity: item.quantity,
            })
            .collect();
        if !lines.is_empty() {
            diesel::insert_into(order_lines::table)
                .values(&lines)
                .execute(self.conn)?;
        }

        self.get_order(order.id)?
            .ok_or_else(|| DomainError::Internal(format!("order {} vanished after save", order.id)))
    }

    fn delete_order(&mut self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = diesel::delete(orders::table.filter(orders::id.eq(id))).execute(self.conn)?;
        Ok(deleted > 0)
    }

    fn find_orders(
        &mut self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        let mut query = orders::table.into_boxed();
        let mut count = orders::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(orders::status.eq(status.as_str()));
            count = count.filter(orders::status.eq(status.as_str()));
        }

        let total: i64 = count.count().get_result(self.conn)?;
        let rows = query
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .limit(page.limit)
            .offset(page.offset())
            .load(self.conn)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut items = self.load_items(&ids)?;
        let orders = rows
            .into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(orders, total, page))
    }
}
