use sqlx::sqlite::SqlitePool;

pub async fn setup(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            budget REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            department_id INTEGER REFERENCES departments(id),
            salary INTEGER,
            hired_on DATE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Text primary key, addressed by code instead of id
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            code TEXT PRIMARY KEY,
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            amount REAL NOT NULL,
            paid_on DATE
        )
        "#,
    )
    .execute(pool)
    .await?;

    seed_sample_data(pool).await
}

async fn seed_sample_data(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let department_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments")
        .fetch_one(pool)
        .await?;

    if department_count.0 > 0 {
        return Ok(());
    }

    let departments = [
        ("Engineering", Some(250_000.0)),
        ("Sales", Some(120_000.0)),
        ("Support", Some(80_000.0)),
        ("Research", None),
    ];
    for (name, budget) in departments {
        sqlx::query("INSERT INTO departments (name, budget) VALUES (?, ?)")
            .bind(name)
            .bind(budget)
            .execute(pool)
            .await?;
    }

    let first_names = [
        "Alice", "Bob", "Charlie", "Diana", "Evan", "Fiona", "George", "Hannah",
        "Isaac", "Julia", "Kevin", "Laura", "Michael", "Nancy", "Oscar", "Patricia",
    ];
    let last_names = [
        "Johnson", "Smith", "Brown", "Prince", "Davis", "Wilson", "Taylor", "Anderson",
        "Thomas", "Jackson", "White", "Harris",
    ];

    // Enough rows for several pages at the default page size
    for index in 0..48 {
        let first = first_names[index % first_names.len()];
        let last = last_names[index % last_names.len()];
        let email = format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), index);
        let department_id = (index % departments.len()) as i64 + 1;
        // Every seventh salary left empty to show null ordering
        let salary = (index % 7 != 0).then(|| 42_000 + (index as i64 * 1_375) % 60_000);
        let hired_on = format!("20{:02}-{:02}-{:02}", 15 + index % 10, index % 12 + 1, index % 28 + 1);

        sqlx::query(
            "INSERT INTO employees (name, email, department_id, salary, hired_on) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(format!("{} {}", first, last))
        .bind(email)
        .bind(department_id)
        .bind(salary)
        .bind(hired_on)
        .execute(pool)
        .await?;
    }

    for index in 0..30 {
        let employee_id = (index % 48) as i64 + 1;
        let amount = 1_200.0 + (index as f64 * 87.5);

        sqlx::query("INSERT INTO payments (code, employee_id, amount, paid_on) VALUES (?, ?, ?, ?)")
            .bind(format!("PAY-{:04}", index + 1))
            .bind(employee_id)
            .bind(amount)
            .bind(format!("2024-{:02}-15", index % 12 + 1))
            .execute(pool)
            .await?;
    }

    tracing::info!(
        departments = departments.len(),
        employees = 48,
        payments = 30,
        "sample data seeded"
    );
    Ok(())
}
