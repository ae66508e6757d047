use std::time::Duration;

use stat_adapters::{ApiEndpoints, DataUrlSessionEncoder, HttpPaymentService, HttpPreviewService, HttpReportService,
                    ResumeStyle};
use stat_core::{InMemoryNavigator, PersistedSession, TipStatus, WorkflowEngine, WorkflowPhase};
use stat_domain::{MissingDataStrategy, UploadedFile, VariableType};
use stat_persistence::FileSessionStore;
use url::Url;

// URL de producción del API como fallback, igual que el frontend original.
const DEFAULT_API_URL: &str = "https://analiza-danych.onrender.com/api";

type Engine = WorkflowEngine<FileSessionStore, InMemoryNavigator>;

fn build_engine(location: Option<Url>, style: ResumeStyle) -> Result<Engine, String> {
    let base = std::env::var("STATFLOW_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let base = Url::parse(&base).map_err(|e| format!("STATFLOW_API_URL inválida: {e}"))?;
    let endpoints = ApiEndpoints::new(base).map_err(|e| format!("endpoints: {e}"))?;
    let client = reqwest::Client::builder().timeout(Duration::from_secs(120))
                                           .build()
                                           .map_err(|e| format!("cliente http: {e}"))?;
    let store = FileSessionStore::open_from_env().map_err(|e| format!("session store: {e}"))?;
    let navigator = match location {
        Some(url) => InMemoryNavigator::at(url),
        None => InMemoryNavigator::fresh(),
    };
    WorkflowEngine::builder(store, navigator)
        .preview(HttpPreviewService::new(client.clone(), &endpoints))
        .payment(HttpPaymentService::new(client.clone(), &endpoints))
        .report(HttpReportService::new(client, &endpoints, style))
        .encoder(DataUrlSessionEncoder)
        .build()
        .map_err(|e| e.to_string())
}

fn parse_type(token: &str) -> Option<VariableType> {
    match token {
        "skip" | "pomiń" | "pomin" => Some(VariableType::Skip),
        "continuous" | "ciągła" | "ciagla" => Some(VariableType::Continuous),
        "binary" | "binarna" => Some(VariableType::Binary),
        "nominal" | "nominalna" => Some(VariableType::Nominal),
        "ordinal" | "porzadkowa" => Some(VariableType::Ordinal),
        _ => None,
    }
}

fn write_report(eng: &Engine, out: &str) {
    match &eng.state().report {
        Some(artifact) => match std::fs::write(out, artifact.html()) {
            Ok(()) => println!("reporte guardado en {out}"),
            Err(e) => {
                eprintln!("[stat run] no se pudo escribir {out}: {e}");
                std::process::exit(5);
            }
        },
        None => println!("fase {} sin artefacto de reporte", eng.state().phase.label()),
    }
}

fn usage() -> ! {
    eprintln!("Uso: stat-cli <preview|run|resume|clear> [opciones]");
    eprintln!("  preview --file <CSV>");
    eprintln!("  run --file <CSV> [--type col=tipo]... [--strategy none|delete_rows|delete_cols|impute]");
    eprintln!("      [--direct] [--out raport.html]");
    eprintln!("  resume --location <URL> [--style reupload|session] [--out raport.html]");
    eprintln!("  clear");
    std::process::exit(2);
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
    }

    match args[1].as_str() {
        "preview" | "run" => {
            let mut file_path: Option<String> = None;
            let mut types: Vec<(String, VariableType)> = Vec::new();
            let mut strategy: Option<MissingDataStrategy> = None;
            let mut direct = false;
            let mut out = "raport.html".to_string();
            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--file" => {
                        i += 1;
                        if i < args.len() {
                            file_path = Some(args[i].clone());
                        }
                    }
                    "--type" => {
                        i += 1;
                        if i < args.len() {
                            match args[i].split_once('=').and_then(|(col, t)| {
                                            parse_type(t).map(|ty| (col.to_string(), ty))
                                        }) {
                                Some(pair) => types.push(pair),
                                None => {
                                    eprintln!("[stat run] --type espera col=tipo, recibí '{}'", args[i]);
                                    std::process::exit(2);
                                }
                            }
                        }
                    }
                    "--strategy" => {
                        i += 1;
                        if i < args.len() {
                            strategy = MissingDataStrategy::from_wire(&args[i]);
                            if strategy.is_none() {
                                eprintln!("[stat run] estrategia desconocida '{}'", args[i]);
                                std::process::exit(2);
                            }
                        }
                    }
                    "--direct" => direct = true,
                    "--out" => {
                        i += 1;
                        if i < args.len() {
                            out = args[i].clone();
                        }
                    }
                    _ => {}
                }
                i += 1;
            }

            let Some(path) = file_path else { usage() };
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("[stat run] no se pudo leer {path}: {e}");
                    std::process::exit(4);
                }
            };
            let name = std::path::Path::new(&path).file_name()
                                                  .map(|n| n.to_string_lossy().into_owned())
                                                  .unwrap_or_else(|| path.clone());
            let file = match UploadedFile::from_bytes(name, bytes) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("[stat run] archivo inválido: {e}");
                    std::process::exit(4);
                }
            };

            let mut eng = match build_engine(None, ResumeStyle::Reupload) {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("[stat run] {e}");
                    std::process::exit(5);
                }
            };

            if let Err(e) = eng.select_file(file).await {
                eprintln!("[stat run] preview falló: {e}");
                std::process::exit(5);
            }
            let state = eng.state();
            println!("columnas:");
            if let (Some(classification), Some(preview)) = (&state.classification, &state.preview) {
                for (idx, col) in classification.columns().enumerate() {
                    let sample = preview.sample_for(idx, 5).join(", ");
                    println!("  {col} [{}] {sample}",
                             classification.type_of(col).map(|t| t.as_wire()).unwrap_or("?"));
                }
            }
            if let Some(missing) = &state.missing {
                if missing.has_missing_data {
                    let cols: Vec<&str> = missing.columns_with_missing_data.iter().map(|s| s.as_str()).collect();
                    println!("datos faltantes en: {}", cols.join(", "));
                }
            }

            if args[1] == "preview" {
                return;
            }

            for (col, ty) in types {
                if let Err(e) = eng.assign_type(&col, ty) {
                    eprintln!("[stat run] tipo para '{col}': {e}");
                    std::process::exit(4);
                }
            }
            if let Some(s) = strategy {
                if let Err(e) = eng.choose_strategy(s) {
                    eprintln!("[stat run] estrategia: {e}");
                    std::process::exit(4);
                }
            }

            if direct {
                match eng.generate_direct().await {
                    Ok(()) => write_report(&eng, &out),
                    Err(e) => {
                        eprintln!("[stat run] generación falló: {e}");
                        std::process::exit(4);
                    }
                }
            } else {
                match eng.submit().await {
                    Ok(()) => {
                        let url = eng.navigator().last_redirect().map(|u| u.to_string()).unwrap_or_default();
                        println!("sesión de pago creada; completá el checkout en:");
                        println!("  {url}");
                        println!("al volver: stat-cli resume --location '<URL de retorno>'");
                    }
                    Err(e) => {
                        eprintln!("[stat run] inicio de pago falló: {e}");
                        std::process::exit(4);
                    }
                }
            }
        }
        "resume" => {
            let mut location: Option<Url> = None;
            let mut style = ResumeStyle::Reupload;
            let mut out = "raport.html".to_string();
            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--location" => {
                        i += 1;
                        if i < args.len() {
                            location = Url::parse(&args[i]).ok();
                        }
                    }
                    "--style" => {
                        i += 1;
                        if i < args.len() {
                            style = match args[i].as_str() {
                                "session" => ResumeStyle::SessionOnly,
                                _ => ResumeStyle::Reupload,
                            };
                        }
                    }
                    "--out" => {
                        i += 1;
                        if i < args.len() {
                            out = args[i].clone();
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            let Some(location) = location else {
                eprintln!("[stat resume] falta --location <URL de retorno>");
                std::process::exit(2);
            };

            let mut eng = match build_engine(Some(location), style) {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("[stat resume] {e}");
                    std::process::exit(5);
                }
            };
            match eng.resume().await {
                Ok(()) => match &eng.state().phase {
                    WorkflowPhase::ReportReady => {
                        if eng.state().tip_status != TipStatus::None {
                            println!("retorno de propina: {:?}", eng.state().tip_status);
                        }
                        write_report(&eng, &out);
                    }
                    WorkflowPhase::PaymentCancelled => {
                        println!("pago cancelado; la sesión quedó guardada para reintentar");
                    }
                    WorkflowPhase::Idle => println!("sin marcadores de retorno: visita normal"),
                    other => println!("fase tras reanudar: {}", other.label()),
                },
                Err(e) => {
                    eprintln!("[stat resume] {e}");
                    std::process::exit(4);
                }
            }
        }
        "clear" => {
            let mut store = match FileSessionStore::open_from_env() {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("[stat clear] session store: {e}");
                    std::process::exit(5);
                }
            };
            match PersistedSession::clear(&mut store) {
                Ok(()) => println!("sesión limpiada"),
                Err(e) => {
                    eprintln!("[stat clear] {e}");
                    std::process::exit(5);
                }
            }
        }
        _ => usage(),
    }
}
