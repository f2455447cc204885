use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{CommandFactory, Parser, ValueEnum};

use tinyraster::obj::load_obj;
use tinyraster::{Color, RenderConfig, Renderer, Shading, Strategy, Texture, Vector3};

#[derive(Debug, Parser)]
#[command(name = "tinyraster", about = "Render an OBJ mesh to a PNG with a software rasterizer")]
struct Cli {
    /// <mesh> [<texture>] <output>
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    #[arg(long, default_value_t = 1000)]
    /// Canvas width in pixels
    width: usize,

    #[arg(long, default_value_t = 1000)]
    /// Canvas height in pixels
    height: usize,

    #[arg(long, value_enum, default_value_t = ShadingArg::Flat)]
    shading: ShadingArg,

    #[arg(long, value_enum, default_value_t = StrategyArg::Bbox)]
    strategy: StrategyArg,

    #[arg(long, default_value_t = 1.0)]
    /// Sample spacing for the scanline strategy
    step: f64,

    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [0.0, 0.0, -1.0])]
    /// Light direction as x,y,z
    light: Vec<f64>,

    #[arg(long, default_value_t = false)]
    /// Outline every visible face
    wireframe: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ShadingArg {
    Flat,
    Gouraud,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Bbox,
    Scanline,
}

impl Cli {
    fn config(&self) -> Result<RenderConfig> {
        let &[x, y, z] = &self.light[..] else {
            bail!("--light takes three numbers, got {}", self.light.len());
        };
        let config = RenderConfig {
            width: self.width,
            height: self.height,
            light_dir: Vector3::new(x, y, z),
            shading: match self.shading {
                ShadingArg::Flat => Shading::Flat,
                ShadingArg::Gouraud => Shading::Gouraud,
            },
            strategy: match self.strategy {
                StrategyArg::Bbox => Strategy::BoundingBox,
                StrategyArg::Scanline => Strategy::Scanline { step: self.step },
            },
            wireframe: self.wireframe.then_some(Color::RED),
            ..RenderConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let (mesh_path, texture_path, output_path) = match &cli.files[..] {
        [mesh, output] => (mesh, None, output),
        [mesh, texture, output] => (mesh, Some(texture), output),
        _ => {
            println!("{}", Cli::command().render_usage());
            return Ok(());
        }
    };

    let config = cli.config()?;
    let mesh = load_obj(mesh_path)?;
    let texture = texture_path.map(Texture::load).transpose()?;

    let mut renderer = Renderer::new(config)?;
    renderer.render(&mesh, texture.as_ref())?;
    renderer.framebuffer().write_png(output_path)?;
    Ok(())
}
