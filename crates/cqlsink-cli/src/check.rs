use crate::cli::CheckArgs;
use crate::config::ProjectConfig;
use cqlsink::ScyllaSession;

pub async fn run(args: CheckArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load(args.config)?;
    let config = &project.file.destination;

    println!("config: {}", project.config_path.display());
    println!("nodes: {}", config.contact_points()?.join(", "));
    println!("table: {}.{}", config.keyspace, config.table);
    println!(
        "existence guards: {}",
        if config.existence_guards { "on" } else { "off" }
    );

    if args.connect {
        let session = ScyllaSession::connect(config).await?;
        let cluster = session.inner().get_cluster_state();
        println!("connected: {} node(s) known", cluster.get_nodes_info().len());
    }

    println!("ok");
    Ok(())
}
