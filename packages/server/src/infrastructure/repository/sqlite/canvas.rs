//! SQLite Canvas Repository 実装

use async_trait::async_trait;
use sqlx::{Row, sqlite::SqlitePool, sqlite::SqliteRow};

use crate::domain::{
    CanvasRepository, CanvasState, Cell, Color, Coordinate, RepositoryError, Timestamp, UserId,
};

/// SQLite Canvas Repository 実装
///
/// `(x, y)` を主キーとする UPSERT で、同じ座標への書き込みを直列化する。
pub struct SqliteCanvasRepository {
    pool: SqlitePool,
}

impl SqliteCanvasRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn read_coordinate(row: &SqliteRow) -> Result<Coordinate, RepositoryError> {
    let x: i64 = row.try_get("x")?;
    let y: i64 = row.try_get("y")?;
    let x = u32::try_from(x).map_err(|_| RepositoryError::CorruptRecord(format!("x={}", x)))?;
    let y = u32::try_from(y).map_err(|_| RepositoryError::CorruptRecord(format!("y={}", y)))?;
    Ok(Coordinate::new(x, y))
}

fn read_color(row: &SqliteRow) -> Result<Color, RepositoryError> {
    let color: String = row.try_get("color")?;
    Color::parse(&color).map_err(|e| RepositoryError::CorruptRecord(e.to_string()))
}

#[async_trait]
impl CanvasRepository for SqliteCanvasRepository {
    async fn get_full_state(&self) -> Result<CanvasState, RepositoryError> {
        let rows = sqlx::query("SELECT x, y, color FROM pixels")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<(Coordinate, Color), RepositoryError> {
                Ok((read_coordinate(row)?, read_color(row)?))
            })
            .collect()
    }

    async fn get_cell(&self, coordinate: Coordinate) -> Result<Option<Cell>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT x, y, color, user_id, placed_at
            FROM pixels
            WHERE x = ? AND y = ?
            "#,
        )
        .bind(i64::from(coordinate.x()))
        .bind(i64::from(coordinate.y()))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let user_id: String = row.try_get("user_id")?;
                let placed_at: i64 = row.try_get("placed_at")?;
                Ok(Some(Cell::new(
                    read_coordinate(&row)?,
                    read_color(&row)?,
                    UserId::new(user_id)
                        .map_err(|e| RepositoryError::CorruptRecord(e.to_string()))?,
                    Timestamp::new(placed_at),
                )))
            }
            None => Ok(None),
        }
    }

    async fn upsert(
        &self,
        coordinate: Coordinate,
        color: Color,
        user_id: UserId,
        timestamp: Timestamp,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO pixels (x, y, color, user_id, placed_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (x, y) DO UPDATE SET
                color = excluded.color,
                user_id = excluded.user_id,
                placed_at = excluded.placed_at
            "#,
        )
        .bind(i64::from(coordinate.x()))
        .bind(i64::from(coordinate.y()))
        .bind(color.as_str())
        .bind(user_id.as_str())
        .bind(timestamp.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
