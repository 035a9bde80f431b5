//! Example demonstrating pipelining and SCAN cursors.
//!
//! Run with: cargo run --example scan

use redbridge::{ConnectionBuilder, Result, ScanOptions};

fn main() -> Result<()> {
    let mut conn = ConnectionBuilder::new()
        .address("redis://127.0.0.1:6379")
        .client_name("scan-demo")
        .connect()?;

    println!("Connected to Redis!");

    // Queue a batch of writes and send them in one round trip
    println!("\nSeeding keys through a pipeline...");
    conn.open_pipeline()?;
    for i in 0..25 {
        let _ = conn.set(format!("demo:user:{i}"), format!("user-{i}"))?;
    }
    let _ = conn.incr("demo:seeded")?;
    let results = conn.close_pipeline()?;
    let failed = results.iter().filter(|r| r.is_err()).count();
    println!("Pipeline returned {} replies ({} failed)", results.len(), failed);

    // SCAN is not available while pipelined
    conn.open_pipeline()?;
    if let Err(e) = conn.scan(ScanOptions::new()) {
        println!("\nWhile pipelined: {e}");
    }
    conn.close_pipeline()?;

    // Walk the key space; closing the cursor releases the connection
    println!("\nScanning demo keys...");
    let mut cursor = conn.scan(ScanOptions::new().pattern("demo:user:*").count(10))?;
    let mut found = 0;
    while cursor.has_next()? {
        if let Some(key) = cursor.next() {
            let key = key?;
            if found < 5 {
                println!("  {}", String::from_utf8_lossy(&key));
            }
            found += 1;
        }
    }
    println!("Found {found} keys, last cursor id {}", cursor.cursor_id());
    cursor.close()?;
    drop(cursor);

    println!("\nConnection closed: {}", conn.is_closed());

    Ok(())
}
