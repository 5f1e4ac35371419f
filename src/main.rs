use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use consorcio_admin::application::admin::AdminService;
use consorcio_admin::config::{AppConfig, StorageBackend};
use consorcio_admin::domain::aviso::AvisoTipo;
use consorcio_admin::domain::consorcio::ConsorcioForm;
use consorcio_admin::domain::expensa::ExpensaFilter;
use consorcio_admin::domain::money::{Money, Percentage};
use consorcio_admin::domain::pago::{MetodoPago, PagoForm};
use consorcio_admin::domain::periodo::Periodo;
use consorcio_admin::domain::ports::KeyValueStoreBox;
use consorcio_admin::domain::unidad::UnidadForm;
use consorcio_admin::error::Result as AdminResult;
use consorcio_admin::infrastructure::in_memory::InMemoryStore;
use consorcio_admin::infrastructure::json_file::JsonFileStore;
#[cfg(feature = "storage-rocksdb")]
use consorcio_admin::infrastructure::rocksdb::RocksDBStore;
use consorcio_admin::interfaces::csv::report_writer::ReportWriter;
use consorcio_admin::interfaces::csv::unidad_reader::UnidadReader;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Administración de consorcios", long_about = None)]
struct Cli {
    /// TOML config file (defaults to ./consorcio.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the stored data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage backend: memory, json or rocksdb
    #[arg(long, global = true)]
    backend: Option<StorageBackend>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage buildings
    #[command(subcommand)]
    Consorcio(ConsorcioCommand),
    /// Manage units of a building
    #[command(subcommand)]
    Unidad(UnidadCommand),
    /// Generate and inspect monthly fees
    #[command(subcommand)]
    Expensa(ExpensaCommand),
    /// Register and inspect payments
    #[command(subcommand)]
    Pago(PagoCommand),
    /// Send and inspect notices
    #[command(subcommand)]
    Aviso(AvisoCommand),
    /// Global and per-consorcio delinquency figures
    Dashboard,
}

#[derive(Args)]
struct ConsorcioArgs {
    #[arg(long)]
    nombre: String,
    #[arg(long)]
    cuit: String,
    #[arg(long)]
    direccion: String,
    #[arg(long)]
    telefono: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    administrador: String,
}

impl From<ConsorcioArgs> for ConsorcioForm {
    fn from(a: ConsorcioArgs) -> Self {
        ConsorcioForm {
            nombre: a.nombre,
            cuit: a.cuit,
            direccion: a.direccion,
            telefono: a.telefono,
            email: a.email,
            administrador: a.administrador,
        }
    }
}

#[derive(Subcommand)]
enum ConsorcioCommand {
    Add(ConsorcioArgs),
    Update {
        id: String,
        #[command(flatten)]
        fields: ConsorcioArgs,
    },
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Deletes the consorcio and everything that belongs to it
    Delete { id: String },
}

#[derive(Args)]
struct UnidadArgs {
    #[arg(long)]
    numero: String,
    #[arg(long)]
    piso: String,
    #[arg(long)]
    propietario: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    telefono: String,
    /// Ownership share, 0 to 100
    #[arg(long)]
    porcentaje: Decimal,
}

impl UnidadArgs {
    fn into_form(self) -> AdminResult<UnidadForm> {
        Ok(UnidadForm {
            numero: self.numero,
            piso: self.piso,
            propietario: self.propietario,
            email: self.email,
            telefono: self.telefono,
            porcentaje: Percentage::new(self.porcentaje)?,
        })
    }
}

#[derive(Subcommand)]
enum UnidadCommand {
    Add {
        #[arg(long)]
        consorcio: String,
        #[command(flatten)]
        fields: UnidadArgs,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: UnidadArgs,
    },
    List {
        #[arg(long)]
        consorcio: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Imports units from a CSV file (numero,piso,propietario,email,telefono,porcentaje)
    Import {
        #[arg(long)]
        consorcio: String,
        file: PathBuf,
    },
}

#[derive(Args)]
struct ExpensaFilterArgs {
    #[arg(long)]
    consorcio: Option<String>,
    /// Period as YYYY-MM
    #[arg(long)]
    periodo: Option<Periodo>,
}

impl From<ExpensaFilterArgs> for ExpensaFilter {
    fn from(a: ExpensaFilterArgs) -> Self {
        ExpensaFilter {
            consorcio_id: a.consorcio,
            periodo: a.periodo,
        }
    }
}

#[derive(Subcommand)]
enum ExpensaCommand {
    /// Splits a base amount across the units of a consorcio
    Generate {
        #[arg(long)]
        consorcio: String,
        #[arg(long)]
        periodo: Periodo,
        #[arg(long)]
        monto: Decimal,
    },
    List(ExpensaFilterArgs),
    Summary(ExpensaFilterArgs),
    /// Writes the monthly report as CSV
    Report {
        #[arg(long)]
        consorcio: String,
        #[arg(long)]
        periodo: Periodo,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum PagoCommand {
    Add {
        #[arg(long)]
        expensa: String,
        #[arg(long)]
        monto: Decimal,
        /// efectivo, transferencia, cheque or debito_automatico
        #[arg(long, default_value = "efectivo")]
        metodo: MetodoPago,
        /// Payment date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        fecha: Option<NaiveDate>,
        #[arg(long)]
        comprobante: Option<String>,
    },
    List {
        #[arg(long)]
        consorcio: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Prints the payment receipt
    Receipt {
        id: String,
    },
}

#[derive(Subcommand)]
enum AvisoCommand {
    Send {
        #[arg(long)]
        consorcio: String,
        /// vencimiento, mora or recordatorio
        #[arg(long)]
        tipo: AvisoTipo,
        /// Message body; the default template when omitted
        #[arg(long)]
        mensaje: Option<String>,
    },
    List {
        #[arg(long)]
        consorcio: Option<String>,
    },
    /// Prints the default message for a notice type
    Template {
        #[arg(long)]
        consorcio: String,
        #[arg(long)]
        tipo: AvisoTipo,
    },
}

fn open_store(config: &AppConfig) -> AdminResult<KeyValueStoreBox> {
    let store: KeyValueStoreBox = match config.backend {
        StorageBackend::Memory => Box::new(InMemoryStore::new()),
        StorageBackend::Json => Box::new(JsonFileStore::open(&config.data_dir)?),
        #[cfg(feature = "storage-rocksdb")]
        StorageBackend::Rocksdb => Box::new(RocksDBStore::open(&config.data_dir)?),
        #[cfg(not(feature = "storage-rocksdb"))]
        StorageBackend::Rocksdb => {
            eprintln!(
                "WARNING: RocksDB storage requested, but 'storage-rocksdb' feature is not enabled. Falling back to JSON storage."
            );
            Box::new(JsonFileStore::open(&config.data_dir)?)
        }
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).into_diagnostic()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    tracing::debug!(?config, "configuration loaded");

    let store = open_store(&config).into_diagnostic()?;
    let service = AdminService::with_options(store, config.service_options());

    run(&service, cli.command).await.into_diagnostic()
}

async fn run(service: &AdminService, command: Command) -> AdminResult<()> {
    match command {
        Command::Consorcio(cmd) => consorcio(service, cmd).await,
        Command::Unidad(cmd) => unidad(service, cmd).await,
        Command::Expensa(cmd) => expensa(service, cmd).await,
        Command::Pago(cmd) => pago(service, cmd).await,
        Command::Aviso(cmd) => aviso(service, cmd).await,
        Command::Dashboard => dashboard(service).await,
    }
}

async fn consorcio(service: &AdminService, cmd: ConsorcioCommand) -> AdminResult<()> {
    match cmd {
        ConsorcioCommand::Add(fields) => {
            let c = service.create_consorcio(fields.into()).await?;
            println!("{}", c.id);
        }
        ConsorcioCommand::Update { id, fields } => {
            let c = service.update_consorcio(&id, fields.into()).await?;
            println!("{}", c.id);
        }
        ConsorcioCommand::List { search } => {
            for c in service.list_consorcios(search.as_deref()).await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    c.id, c.nombre, c.cuit, c.direccion, c.administrador
                );
            }
        }
        ConsorcioCommand::Delete { id } => {
            let removed = service.delete_consorcio(&id).await?;
            println!(
                "Consorcio eliminado ({} unidades, {} expensas, {} pagos, {} avisos)",
                removed.unidades, removed.expensas, removed.pagos, removed.avisos
            );
        }
    }
    Ok(())
}

async fn unidad(service: &AdminService, cmd: UnidadCommand) -> AdminResult<()> {
    match cmd {
        UnidadCommand::Add { consorcio, fields } => {
            let u = service.create_unidad(&consorcio, fields.into_form()?).await?;
            println!("{}", u.id);
        }
        UnidadCommand::Update { id, fields } => {
            let u = service.update_unidad(&id, fields.into_form()?).await?;
            println!("{}", u.id);
        }
        UnidadCommand::List { consorcio, search } => {
            let unidades = service
                .list_unidades(consorcio.as_deref(), search.as_deref())
                .await?;
            for u in &unidades {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    u.id, u.numero, u.piso, u.propietario, u.porcentaje
                );
            }
            let total: Decimal = unidades.iter().map(|u| u.porcentaje.value()).sum();
            if consorcio.is_some() {
                println!("Porcentaje asignado: {total}%");
            }
        }
        UnidadCommand::Delete { id } => {
            let removed = service.delete_unidad(&id).await?;
            println!(
                "Unidad eliminada ({} expensas, {} pagos, {} avisos)",
                removed.expensas, removed.pagos, removed.avisos
            );
        }
        UnidadCommand::Import { consorcio, file } => {
            let reader = UnidadReader::new(File::open(file)?);
            let report = service
                .import_unidades(&consorcio, reader.unidades())
                .await?;
            for rejected in &report.rejected {
                eprintln!("Error importing line {}: {}", rejected.line, rejected.error);
            }
            println!(
                "Importadas {} unidades, {} rechazadas",
                report.imported.len(),
                report.rejected.len()
            );
        }
    }
    Ok(())
}

async fn expensa(service: &AdminService, cmd: ExpensaCommand) -> AdminResult<()> {
    match cmd {
        ExpensaCommand::Generate {
            consorcio,
            periodo,
            monto,
        } => {
            let generated = service
                .generate_expensas(&consorcio, periodo, Money::new(monto))
                .await?;
            if generated.replaced > 0 {
                eprintln!(
                    "Replaced {} expensas and {} pagos for {periodo}",
                    generated.replaced, generated.dropped_pagos
                );
            }
            let unidades = service.list_unidades(Some(&consorcio), None).await?;
            for e in &generated.expensas {
                let numero = unidades
                    .iter()
                    .find(|u| u.id == e.unidad_id)
                    .map(|u| u.numero.as_str())
                    .unwrap_or("-");
                println!("{}\t{}\t{}\t{}", e.id, numero, e.monto, e.vencimiento);
            }
            println!("Total: {}", generated.total()?);
        }
        ExpensaCommand::List(filter) => {
            let expensas = service.list_expensas(&filter.into()).await?;
            let unidades = service.list_unidades(None, None).await?;
            for e in &expensas {
                let numero = unidades
                    .iter()
                    .find(|u| u.id == e.unidad_id)
                    .map(|u| u.numero.as_str())
                    .unwrap_or("-");
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    e.id,
                    e.periodo,
                    numero,
                    e.monto,
                    e.vencimiento,
                    e.estado()
                );
            }
        }
        ExpensaCommand::Summary(filter) => {
            let s = service.period_summary(&filter.into()).await?;
            println!("Total: {}", s.total);
            println!("Expensas: {}", s.count);
            println!("Pagadas: {}", s.pagadas);
            println!("Pendientes: {}", s.pendientes);
            println!("Morosidad: {:.2}%", s.morosidad);
        }
        ExpensaCommand::Report {
            consorcio,
            periodo,
            output,
        } => {
            let report = service.monthly_report(&consorcio, periodo).await?;
            match output {
                Some(path) => {
                    ReportWriter::new(File::create(&path)?).write_report(&report)?;
                    println!(
                        "{} {}: expensas {}, pagos {}, morosidad {:.2}%",
                        report.consorcio.nombre,
                        report.periodo,
                        report.total_expensas,
                        report.total_pagos,
                        report.morosidad
                    );
                }
                None => ReportWriter::new(io::stdout().lock()).write_report(&report)?,
            }
        }
        ExpensaCommand::Delete { id } => {
            let pagos = service.delete_expensa(&id).await?;
            println!("Expensa eliminada ({pagos} pagos)");
        }
    }
    Ok(())
}

async fn pago(service: &AdminService, cmd: PagoCommand) -> AdminResult<()> {
    match cmd {
        PagoCommand::Add {
            expensa,
            monto,
            metodo,
            fecha,
            comprobante,
        } => {
            let pago = service
                .register_pago(PagoForm {
                    expensa_id: expensa,
                    fecha: fecha.unwrap_or_else(|| Local::now().date_naive()),
                    monto: Money::new(monto),
                    metodo_pago: metodo,
                    comprobante,
                })
                .await?;
            println!("{}", pago.id);
        }
        PagoCommand::List { consorcio, search } => {
            let pagos = service
                .list_pagos(consorcio.as_deref(), search.as_deref())
                .await?;
            for p in &pagos {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    p.id, p.fecha, p.expensa_id, p.monto, p.metodo_pago
                );
            }
            let summary = service
                .pago_summary(
                    consorcio.as_deref(),
                    search.as_deref(),
                    Local::now().date_naive(),
                )
                .await?;
            println!(
                "Total: {} ({} pagos), este mes: {}",
                summary.total, summary.count, summary.total_mes
            );
        }
        PagoCommand::Delete { id } => match service.delete_pago(&id).await? {
            Some(p) => println!("Pago eliminado ({})", p.monto),
            None => println!("Pago inexistente, nada que eliminar"),
        },
        PagoCommand::Receipt { id } => {
            println!("{}", service.receipt(&id).await?);
        }
    }
    Ok(())
}

async fn aviso(service: &AdminService, cmd: AvisoCommand) -> AdminResult<()> {
    match cmd {
        AvisoCommand::Send {
            consorcio,
            tipo,
            mensaje,
        } => {
            let mensaje = match mensaje {
                Some(m) => m,
                None => service.default_notice_message(&consorcio, tipo).await?,
            };
            let sent = service
                .send_avisos(&consorcio, tipo, &mensaje, Utc::now())
                .await?;
            println!("Avisos enviados: {}", sent.len());
        }
        AvisoCommand::List { consorcio } => {
            for a in service.list_avisos(consorcio.as_deref()).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    a.id,
                    a.fecha_envio.format("%Y-%m-%d %H:%M"),
                    a.tipo,
                    a.unidad_id
                );
            }
            let s = service
                .aviso_summary(consorcio.as_deref(), Local::now().date_naive())
                .await?;
            println!(
                "Total: {}, hoy: {}, mora: {}, vencimiento: {}",
                s.total, s.hoy, s.mora, s.vencimiento
            );
        }
        AvisoCommand::Template { consorcio, tipo } => {
            println!("{}", service.default_notice_message(&consorcio, tipo).await?);
        }
    }
    Ok(())
}

async fn dashboard(service: &AdminService) -> AdminResult<()> {
    let d = service.dashboard().await?;
    println!("Consorcios: {}", d.total_consorcios);
    println!("Unidades: {}", d.total_unidades);
    println!(
        "Expensas: {} (pagadas {}, pendientes {})",
        d.total_expensas, d.expensas_pagadas, d.expensas_pendientes
    );
    println!("Pagos: {}", d.total_pagos);
    println!("Total expensas: {}", d.monto_expensas);
    println!("Total pagos: {}", d.monto_pagos);
    println!("Morosidad: {:.2}%", d.morosidad);
    if d.alerta_morosidad {
        println!(
            "ALERTA: morosidad superior al {}%",
            service.options().delinquency_alert_threshold
        );
    }
    for row in &d.consorcios {
        println!(
            "{}\t{}\t{} unidades\t{:.2}%\t{:?}",
            row.nombre, row.consorcio_id, row.unidades, row.morosidad, row.severity
        );
    }
    Ok(())
}
