//! `readchat serve`: Start the web UI and HTTP API.

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;
    super::require_api_key(&config);

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("readchat");
    println!("   UI:      http://{}:{}/", config.gateway.host, config.gateway.port);
    println!("   Model:   {}", config.model);
    println!("   Memory:  {:?}", config.memory.backend);

    readchat_gateway::start(config).await?;

    Ok(())
}
