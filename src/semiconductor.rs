use std::{ env, io::{ self, Write } };
use anyhow::Context;
use log::info;
use ndarray as nd;
use simplelog::{ ColorChoice, TermLogger, TerminalMode };
use jshoot::config::Config;

// solve the current-continuity BVP for the worked example (or a JSON config
// given as the first argument) and print the curves for plotting

fn main() -> anyhow::Result<()> {
    let config: Config
        = match env::args().nth(1) {
            Some(path) => Config::from_file(&path)
                .with_context(|| format!("failed to load config from {path}"))?,
            None => Config::default(),
        };
    TermLogger::init(
        config.level_filter()?,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    info!(
        "theta = {}, G = {}, n_i = {}, {} points",
        config.theta, config.g, config.ni, config.npoints,
    );

    let sys = config.system()?;
    let (ivp_method, root_method) = config.methods();
    info!("integrator: {:?}; root-finder: {:?}", ivp_method, root_method);
    let sol = sys.solve(ivp_method, root_method)?;
    let (n, p) = sys.densities();
    let total_dev: f64
        = (sol.currents.total() - 2.0 * sol.j)
        .fold(0.0, |acc, dk| acc.max(dk.abs()));
    info!("max |j_p + j_n - 2J| = {:.3e}", total_dev);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "# J* = {:.12e}", sol.j)?;
    writeln!(out, "# j_n(1; J*) = {:.3e}", sol.residual)?;
    writeln!(out, "# status = {:?} after {} iterations", sol.status, sol.iters)?;
    writeln!(out, "# x n p jp jn")?;
    let iter
        = nd::Zip::from(sys.get_x()).and(&n).and(&p)
        .and(&sol.currents.jp).and(&sol.currents.jn);
    let mut res: io::Result<()> = Ok(());
    iter.for_each(|xk, nk, pk, jpk, jnk| {
        if res.is_ok() {
            res = writeln!(out, "{xk:.6} {nk:.12e} {pk:.12e} {jpk:.12e} {jnk:.12e}");
        }
    });
    res?;
    if !sol.is_converged() {
        anyhow::bail!("root search did not converge");
    }
    Ok(())
}
