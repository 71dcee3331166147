use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use roombook::application::booking::BookingService;
use roombook::config::{DEFAULT_CONFIG_FILE, load_config};
use roombook::domain::filter::ReservationFilter;
use roombook::domain::intake::{BookingRequest, IntakeChannel};
use roombook::domain::ports::ReservationStoreBox;
use roombook::domain::reservation::{GuestDetails, LifecycleState, RoomCategory};
use roombook::domain::stay::{DateRange, Stay, StayInstant};
use roombook::infrastructure::in_memory::InMemoryReservationStore;
#[cfg(feature = "storage-rocksdb")]
use roombook::infrastructure::rocksdb::RocksDBStore;
use roombook::interfaces::csv::reservation_reader::ReservationReader;
use roombook::interfaces::csv::reservation_writer::ReservationWriter;
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of rooms in the pool, overriding the configuration
    #[arg(long)]
    capacity: Option<u32>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Reservations CSV file loaded before running the command
    #[arg(long)]
    input: Option<PathBuf>,

    /// Date used as "today" (defaults to the local date)
    #[arg(long)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Per-day occupancy over an inclusive date range
    Availability {
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the range (defaults to --from)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Occupancy over the reporting window starting today
    Calendar,
    /// Create a reservation
    Book(BookArgs),
    /// Change the lifecycle state of a reservation
    SetStatus { id: Uuid, status: LifecycleState },
    /// Overwrite the payments recorded on a reservation
    RecordPayment {
        id: Uuid,
        #[arg(long, default_value_t = Decimal::ZERO)]
        initial: Decimal,
        #[arg(long = "final", default_value_t = Decimal::ZERO)]
        final_payment: Decimal,
    },
    /// Ledger of a single reservation
    Ledger { id: Uuid },
    /// Booking statistics
    Stats,
    /// Write reservations as CSV
    Export {
        /// Only reservations in this state
        #[arg(long)]
        status: Option<LifecycleState>,
        /// Case-insensitive match on guest name, email, phone or room type
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Args)]
struct BookArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long, default_value = "standard-room-only")]
    room_type: RoomCategory,
    /// Arrival day, or date-time (partial days round up to a night)
    #[arg(long)]
    check_in: StayInstant,
    #[arg(long)]
    check_out: StayInstant,
    #[arg(long, default_value_t = 1)]
    guests: u8,
    #[arg(long)]
    special_requests: Option<String>,
    #[arg(long, default_value = "pending")]
    status: LifecycleState,
    #[arg(long, default_value_t = Decimal::ZERO)]
    initial_payment: Decimal,
    #[arg(long, default_value_t = Decimal::ZERO)]
    final_payment: Decimal,
    /// Apply the public booking form rules (no past check-in, pending, unpaid)
    #[arg(long)]
    guest_form: bool,
}

impl BookArgs {
    fn into_request(self) -> roombook::error::Result<(BookingRequest, IntakeChannel)> {
        let stay = Stay::between(self.check_in, self.check_out)?;
        let channel = if self.guest_form {
            IntakeChannel::Guest
        } else {
            IntakeChannel::Staff
        };
        let request = BookingRequest {
            guest: GuestDetails {
                name: self.name,
                email: self.email,
                phone: self.phone,
                guests_count: self.guests,
                special_requests: self.special_requests,
            },
            room_category: self.room_type,
            check_in: stay.check_in(),
            check_out: stay.check_out(),
            status: self.status,
            initial_payment: self.initial_payment,
            final_payment: self.final_payment,
        };
        Ok((request, channel))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<ReservationStoreBox> {
    match db_path {
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryReservationStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<ReservationStoreBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryReservationStore::new()))
}

async fn import(service: &BookingService, path: &Path) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let reader = ReservationReader::new(file);
    for result in reader.reservations() {
        match result {
            Ok(reservation) => {
                if let Err(e) = service.import(reservation).await {
                    tracing::error!("Error importing reservation: {e}");
                }
            }
            Err(e) => {
                tracing::error!("Error reading reservation: {e}");
            }
        }
    }
    Ok(())
}

async fn run(service: &BookingService, command: Command, today: NaiveDate) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = ReservationWriter::new(stdout.lock());

    match command {
        Command::Availability { from, to } => {
            let range = DateRange::new(from, to.unwrap_or(from)).into_diagnostic()?;
            let report = service.availability(range).await.into_diagnostic()?;
            writer.write_availability(&report).into_diagnostic()?;
        }
        Command::Calendar => {
            let report = service.calendar(today).await.into_diagnostic()?;
            writer.write_availability(&report).into_diagnostic()?;
        }
        Command::Book(args) => {
            let (request, channel) = args.into_request().into_diagnostic()?;
            let reservation = service
                .submit(request, channel, today)
                .await
                .into_diagnostic()?;
            writer.write_reservations([&reservation]).into_diagnostic()?;
        }
        Command::SetStatus { id, status } => {
            let reservation = service.update_status(id, status).await.into_diagnostic()?;
            writer.write_reservations([&reservation]).into_diagnostic()?;
        }
        Command::RecordPayment {
            id,
            initial,
            final_payment,
        } => {
            let reservation = service
                .record_payments(id, initial, final_payment)
                .await
                .into_diagnostic()?;
            writer.write_reservations([&reservation]).into_diagnostic()?;
        }
        Command::Ledger { id } => {
            let ledger = service.ledger(id).await.into_diagnostic()?;
            writer.write_ledger(&ledger).into_diagnostic()?;
        }
        Command::Stats => {
            let summary = service.summary(today).await.into_diagnostic()?;
            writer.write_summary(&summary).into_diagnostic()?;
        }
        Command::Export { status, search } => {
            let filter = ReservationFilter { status, search };
            let reservations = service.reservations(&filter).await.into_diagnostic()?;
            writer.write_reservations(&reservations).into_diagnostic()?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = load_config(&config_path).into_diagnostic()?;
    if let Some(capacity) = cli.capacity {
        config.pool.capacity = capacity;
        config.validate().into_diagnostic()?;
    }

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let service = BookingService::new(open_store(cli.db_path)?, config);

    if let Some(input) = &cli.input {
        import(&service, input).await?;
    }

    run(&service, cli.command, today).await
}
