use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, InspectContainerOptions, InspectNetworkOptionsBuilder,
    RemoveContainerOptionsBuilder, StartContainerOptions, StopContainerOptionsBuilder,
};
use bollard::secret::{
    ContainerCreateBody, EndpointIpamConfig, EndpointSettings, HostConfig, NetworkCreateRequest,
    NetworkingConfig,
};
use std::collections::HashMap;
use std::time::Duration;

use crate::driver::ContainerDriver;
use crate::error::{ContainerError, ContainerResult};
use crate::types::{ContainerSpec, ContainerState, ContainerStatus};

/// `ContainerDriver` backed by a local Docker (or Docker-compatible) engine via
/// `bollard`. The engine connection is resolved the same way the Docker CLI does:
/// `DOCKER_HOST` if set, otherwise the platform's local default socket.
pub struct BollardContainerDriver {
    docker: Docker,
}

impl BollardContainerDriver {
    pub fn connect(docker_host: Option<&str>) -> ContainerResult<Self> {
        let docker = match docker_host {
            Some(host) => Docker::connect_with_http(host, 120, bollard::API_DEFAULT_VERSION),
            None => Docker::connect_with_local_defaults(),
        }
        .map_err(|e| ContainerError::Unavailable(e.to_string()))?;

        Ok(Self { docker })
    }
}

fn classify(err: bollard::errors::Error) -> ContainerError {
    match &err {
        bollard::errors::Error::DockerResponseServerError { status_code, message } => {
            match *status_code {
                404 => ContainerError::NotFound(message.clone()),
                409 => ContainerError::FailedPrecondition(message.clone()),
                _ => ContainerError::Internal(message.clone()),
            }
        }
        bollard::errors::Error::HyperResponseError(_) | bollard::errors::Error::IOError { .. } => {
            ContainerError::Unavailable(err.to_string())
        }
        _ => ContainerError::Internal(err.to_string()),
    }
}

#[async_trait]
impl ContainerDriver for BollardContainerDriver {
    async fn create_bridge_network(
        &self,
        name: &str,
        labels: HashMap<String, String>,
    ) -> ContainerResult<String> {
        let existing = self
            .docker
            .inspect_network(name, Some(InspectNetworkOptionsBuilder::new().build()))
            .await;

        if let Ok(network) = existing {
            if let Some(id) = network.id {
                return Ok(id);
            }
        }

        let response = self
            .docker
            .create_network(NetworkCreateRequest {
                name: name.to_string(),
                driver: Some("bridge".to_string()),
                labels: Some(labels),
                ..Default::default()
            })
            .await
            .map_err(classify)?;

        response
            .id
            .ok_or_else(|| ContainerError::Internal("engine returned no network id".to_string()))
    }

    async fn remove_bridge_network(&self, name: &str) -> ContainerResult<()> {
        match self.docker.remove_network(name).await {
            Ok(()) => Ok(()),
            Err(err) => match classify(err) {
                ContainerError::NotFound(_) => Ok(()),
                other => Err(other),
            },
        }
    }

    async fn create_container(&self, spec: ContainerSpec) -> ContainerResult<String> {
        let mut endpoint = EndpointSettings::default();
        if let Some(ip) = &spec.static_ip {
            endpoint.ipam_config = Some(EndpointIpamConfig {
                ipv4_address: Some(ip.clone()),
                ..Default::default()
            });
        }

        let mut endpoints_config = HashMap::new();
        endpoints_config.insert(spec.network.clone(), endpoint);

        let body = ContainerCreateBody {
            image: Some(spec.image.clone()),
            cmd: spec.command.clone(),
            labels: Some(spec.labels.clone()),
            networking_config: Some(NetworkingConfig {
                endpoints_config: Some(endpoints_config),
            }),
            host_config: Some(HostConfig {
                network_mode: Some(spec.network.clone()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = CreateContainerOptionsBuilder::new().name(&spec.name).build();

        let created = self
            .docker
            .create_container(Some(options), body)
            .await
            .map_err(classify)?;

        if let Err(err) = self.start_container(&created.id).await {
            // Roll back the half-started container rather than leaving it behind.
            let _ = self.remove_container(&created.id, true).await;
            return Err(err);
        }

        Ok(created.id)
    }

    async fn start_container(&self, id: &str) -> ContainerResult<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await
            .map_err(classify)
    }

    async fn stop_container(&self, id: &str, timeout: Duration) -> ContainerResult<()> {
        let options = StopContainerOptionsBuilder::new().t(timeout.as_secs() as i32).build();

        match self.docker.stop_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            Err(err) => match classify(err) {
                ContainerError::NotFound(msg) => Err(ContainerError::NotFound(msg)),
                other => Err(other),
            },
        }
    }

    async fn remove_container(&self, id: &str, force: bool) -> ContainerResult<()> {
        let options = RemoveContainerOptionsBuilder::new().force(force).v(true).build();

        match self.docker.remove_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            Err(err) => match classify(err) {
                ContainerError::NotFound(_) => Ok(()),
                other => Err(other),
            },
        }
    }

    async fn inspect_container(&self, id: &str) -> ContainerResult<ContainerStatus> {
        let inspected = match self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
        {
            Ok(inspected) => inspected,
            Err(err) => match classify(err) {
                ContainerError::NotFound(_) => {
                    return Ok(ContainerStatus {
                        state: ContainerState::Missing,
                        network_ip: None,
                    });
                }
                other => return Err(other),
            },
        };

        let running = inspected
            .state
            .as_ref()
            .and_then(|s| s.running)
            .unwrap_or(false);

        let network_ip = inspected
            .network_settings
            .and_then(|settings| settings.networks)
            .and_then(|networks| networks.into_values().next())
            .and_then(|endpoint| endpoint.ip_address)
            .filter(|ip| !ip.is_empty());

        Ok(ContainerStatus {
            state: if running {
                ContainerState::Running
            } else {
                ContainerState::Exited
            },
            network_ip,
        })
    }
}
