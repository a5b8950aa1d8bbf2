//! ESP-IDF HTTP server adapter.
//!
//! Registers one GET handler per [`Route`] and forwards each request to
//! [`api::handle`].  Handlers run on the httpd task, so the service is
//! shared with the main loop behind a mutex.  Large bodies (the CSV log
//! and static files) are streamed in fixed chunks; the log download takes
//! the lock once per chunk so sampling ticks are not held up.

#[cfg(target_os = "espidf")]
pub use imp::create_http_server;

/// Bytes per streamed chunk.
pub const STREAM_CHUNK: usize = 1024;

#[cfg(target_os = "espidf")]
mod imp {
    use std::fs::File;
    use std::io::Read as _;
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use embedded_svc::http::Method;
    use embedded_svc::io::Write;
    use esp_idf_svc::http::server::{
        Configuration as HttpConfiguration, EspHttpConnection, EspHttpServer, Request,
    };
    use log::{info, warn};

    use super::STREAM_CHUNK;
    use crate::adapters::log_sink::LogEventSink;
    use crate::adapters::log_store::FsLogStore;
    use crate::adapters::time::UptimeClock;
    use crate::app::api::{self, ApiResponse, Body, Route};
    use crate::app::ports::{LogStorePort, PressurePort};
    use crate::app::service::LoggerService;

    type Shared<A> = Arc<Mutex<LoggerService<A, FsLogStore>>>;

    pub fn create_http_server<A>(
        service: Shared<A>,
        clock: UptimeClock,
        mount_point: &str,
    ) -> anyhow::Result<EspHttpServer<'static>>
    where
        A: PressurePort + Send + 'static,
    {
        let conf = HttpConfiguration {
            stack_size: 10 * 1024,
            max_uri_handlers: Route::ALL.len() + 2,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&conf)?;

        for route in Route::ALL {
            let service = service.clone();
            let mount_point = mount_point.to_owned();
            server.fn_handler::<anyhow::Error, _>(route.path(), Method::Get, move |req| {
                let (_, query) = api::split_uri(req.uri());
                let query = query.map(str::to_owned);
                let now_ms = clock.uptime_ms();

                let response = {
                    let mut svc = service
                        .lock()
                        .map_err(|_| anyhow!("service lock poisoned"))?;
                    api::handle(&mut svc, route, query.as_deref(), now_ms, &mut LogEventSink)
                };
                send(req, response, &service, &mount_point)
            })?;
        }

        info!("http: {} routes registered", Route::ALL.len());
        Ok(server)
    }

    fn send<A: PressurePort>(
        req: Request<&mut EspHttpConnection<'_>>,
        response: ApiResponse,
        service: &Shared<A>,
        mount_point: &str,
    ) -> anyhow::Result<()> {
        // Open static files before committing to a 200.
        let mut asset_file = None;
        if let Body::Asset(asset) = &response.body {
            let path = format!("{}/{}", mount_point, asset.file);
            match File::open(&path) {
                Ok(f) => asset_file = Some(f),
                Err(e) => {
                    warn!("http: {} unavailable ({})", path, e);
                    return send(req, ApiResponse::not_found(), service, mount_point);
                }
            }
        }

        let mut headers = vec![("Content-Type", response.content_type)];
        if let Some(disposition) = response.content_disposition {
            headers.push(("Content-Disposition", disposition));
        }
        let mut resp = req.into_response(response.status, None, &headers)?;

        match response.body {
            Body::Text(text) => resp.write_all(text.as_bytes())?,
            Body::LogFile { len } => {
                let mut buf = [0u8; STREAM_CHUNK];
                let mut offset = 0u64;
                while offset < len {
                    let n = {
                        let svc = service
                            .lock()
                            .map_err(|_| anyhow!("service lock poisoned"))?;
                        svc.store().read_at(offset, &mut buf)
                    }
                    .map_err(|e| anyhow!("log read at {}: {}", offset, e))?;
                    if n == 0 {
                        break;
                    }
                    resp.write_all(&buf[..n])?;
                    offset += n as u64;
                }
            }
            Body::Asset(_) => {
                if let Some(mut file) = asset_file {
                    let mut buf = [0u8; STREAM_CHUNK];
                    loop {
                        let n = file.read(&mut buf)?;
                        if n == 0 {
                            break;
                        }
                        resp.write_all(&buf[..n])?;
                    }
                }
            }
        }
        Ok(())
    }
}
