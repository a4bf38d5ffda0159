use crate::db::{get_metadata, Store};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::{categories, Totals};
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Currency:   {}", settings.currency_symbol);

    if db_path.exists() {
        let store = Store::open(&db_path)?;
        let version = get_metadata(store.connection(), "schema_version");
        println!("Schema:     {}", version.as_deref().unwrap_or("(unknown)"));

        let rows = store.list_all()?;
        let totals = Totals::of(&rows);
        println!();
        println!("Transactions:  {}", store.count()?);
        println!("Categories:    {}", categories(&rows).len());
        println!("Net balance:   {}", money(totals.net, &settings.currency_symbol));
        store.close()?;
    } else {
        println!();
        println!("Database not found. Run `tally init` to set up.");
    }

    Ok(())
}
